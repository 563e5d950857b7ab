//! Recipe contract error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RecipeError {
    #[error("{reference}: invalid configuration: {message}")]
    ConfigurationInvalid { reference: String, message: String },

    #[error("{reference}: metadata contract violated: {message}")]
    ContractViolation { reference: String, message: String },

    #[error("unknown option '{option}'")]
    UnknownOption { option: String },

    #[error("option '{option}' was erased and no longer carries a value")]
    OptionErased { option: String },

    #[error("value '{value}' is outside the declared domain of option '{option}'")]
    OptionOutOfDomain { option: String, value: String },

    #[error("option '{option}' has no value after configure")]
    OptionUnset { option: String },

    #[error("hook '{hook}' ran out of lifecycle order (expected {expected})")]
    HookOutOfOrder { hook: String, expected: String },

    #[error("package folder is frozen; writes after package_info are undefined")]
    PackageFolderFrozen,

    #[error("setting '{setting}' is not populated in the active profile")]
    SettingMissing { setting: String },
}

impl UserFacingError for RecipeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigurationInvalid { .. } => {
                Some("Adjust the profile or recipe options to a supported combination.")
            }
            Self::OptionOutOfDomain { .. } | Self::UnknownOption { .. } => {
                Some("Check the option name and its declared domain in the recipe.")
            }
            Self::SettingMissing { .. } => {
                Some("Populate the missing setting in the active profile.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ConfigurationInvalid { .. } => "recipe.configuration_invalid",
            Self::ContractViolation { .. } => "recipe.contract_violation",
            Self::UnknownOption { .. } => "recipe.unknown_option",
            Self::OptionErased { .. } => "recipe.option_erased",
            Self::OptionOutOfDomain { .. } => "recipe.option_out_of_domain",
            Self::OptionUnset { .. } => "recipe.option_unset",
            Self::HookOutOfOrder { .. } => "recipe.hook_out_of_order",
            Self::PackageFolderFrozen => "recipe.package_folder_frozen",
            Self::SettingMissing { .. } => "recipe.setting_missing",
        };
        Some(code)
    }
}
