//! Integration tests for error types

#[cfg(test)]
mod tests {
    use ferrite_errors::*;

    #[test]
    fn test_error_conversion() {
        let source_err = SourceError::FetchFailed {
            url: "https://example.com/pkg.tar.gz".into(),
            message: "connection reset".into(),
        };
        let err: Error = source_err.into();
        assert!(matches!(err, Error::Source(_)));
    }

    #[test]
    fn test_error_display() {
        let err = RecipeError::ConfigurationInvalid {
            reference: "cjson/1.7.18".into(),
            message: "shared builds need fPIC on this target".into(),
        };
        assert_eq!(
            err.to_string(),
            "cjson/1.7.18: invalid configuration: shared builds need fPIC on this target"
        );
    }

    #[test]
    fn test_error_clone() {
        let err = BuildError::ToolMissing { tool: "cmake".into() };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_retryability_surface() {
        let fetch: Error = SourceError::FetchFailed {
            url: "https://example.com".into(),
            message: "timeout".into(),
        }
        .into();
        assert!(fetch.is_retryable());

        let invalid: Error = RecipeError::ConfigurationInvalid {
            reference: "flite/2.2".into(),
            message: "unsupported".into(),
        }
        .into();
        assert!(!invalid.is_retryable());
        assert_eq!(invalid.user_code(), Some("recipe.configuration_invalid"));
    }
}
