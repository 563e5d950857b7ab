//! Integration tests for the event channel

#[cfg(test)]
mod tests {
    use ferrite_events::*;

    #[tokio::test]
    async fn events_flow_through_the_channel_in_order() {
        let (tx, mut rx) = channel();
        let emitter = Some(tx);

        emitter.emit(AppEvent::Lifecycle(LifecycleEvent::StateEntered {
            reference: "cjson/1.7.18".into(),
            state: "configure".into(),
        }));
        emitter.emit(AppEvent::Lifecycle(LifecycleEvent::StateCompleted {
            reference: "cjson/1.7.18".into(),
            state: "configure".into(),
        }));

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Lifecycle(LifecycleEvent::StateEntered { .. }))
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Lifecycle(LifecycleEvent::StateCompleted { .. }))
        ));
    }

    #[test]
    fn levels_route_to_the_right_severity() {
        let debug = AppEvent::General(GeneralEvent::Debug {
            message: "probe".into(),
        });
        assert_eq!(debug.level(), EventLevel::Debug);

        let error = AppEvent::General(GeneralEvent::Error {
            message: "boom".into(),
        });
        assert_eq!(error.level(), EventLevel::Error);
        assert!(EventLevel::Error > EventLevel::Warning);
    }

    #[test]
    fn events_serialize_for_structured_consumers() {
        let event = AppEvent::Build(BuildEvent::GeneratorWritten {
            generator: "CMakeToolchain".into(),
            files: vec!["ferrite_toolchain.cmake".into()],
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"domain\":\"build\""));
        assert!(json.contains("CMakeToolchain"));
    }
}
