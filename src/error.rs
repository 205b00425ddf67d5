use thiserror::Error;

use crate::meta::SemanticType;

/// Error type returned by command run functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum FlagfigError {
    #[error("Flag '{0}' is defined more than once")]
    DuplicateFlagName(String),

    #[error("Short flag '-{short}' is used by both '{first}' and '{second}'")]
    DuplicateShortFlag {
        short: char,
        first: String,
        second: String,
    },

    #[error("Invalid flag '{flag}': {reason}")]
    InvalidFlag { flag: String, reason: String },

    #[error("Field '{field}' of {record} is an unexported field (it is not serialized)")]
    UnexportedField {
        field: &'static str,
        record: &'static str,
    },

    #[error(transparent)]
    ArgumentParse(#[from] clap::Error),

    #[error("Invalid value '{value}' for '--{flag}': {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    HelpRequested(String),

    #[error("{flag}: no parser for type {semantic}")]
    MissingParser {
        flag: String,
        semantic: SemanticType,
    },

    #[error("Some flags have no parser and were not bound")]
    MissingParsers(Vec<FlagfigError>),

    #[error("A parser for type {0} is already registered")]
    DuplicateParser(SemanticType),

    #[error("Field for '{flag}' ({type_name}) is not settable: {reason}")]
    NotSettable {
        flag: String,
        type_name: String,
        reason: String,
    },

    #[error("Flag '{0}' default value not provided")]
    MissingDefaultValue(String),

    #[error("Failed to read configuration value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unknown flag '{0}'")]
    UnknownFlag(String),

    #[error("Command '{0}' not found")]
    CommandNotFound(String),

    #[error("Command '{0}' has no run function")]
    NoRunFunction(String),

    #[error("Command '{command}' failed: {source}")]
    Run { command: String, source: BoxError },
}

impl FlagfigError {
    /// Errors caused by what the user typed, as opposed to how the
    /// configuration type was declared. A CLI wrapper prints usage for these.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            FlagfigError::ArgumentParse(_)
                | FlagfigError::InvalidValue { .. }
                | FlagfigError::HelpRequested(_)
                | FlagfigError::UnknownFlag(_)
                | FlagfigError::CommandNotFound(_)
        )
    }

    /// Diagnostics that never abort a load: the configuration was still
    /// populated, only some flags were left unbound.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            FlagfigError::MissingParser { .. } | FlagfigError::MissingParsers(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_flag_formats() {
        let err = FlagfigError::DuplicateFlagName("db.ip".into());
        assert!(err.to_string().contains("db.ip"));
    }

    #[test]
    fn missing_parser_names_flag_and_type() {
        let err = FlagfigError::MissingParser {
            flag: "owner.servers".into(),
            semantic: SemanticType::Custom("servers"),
        };
        let msg = err.to_string();
        assert!(msg.contains("owner.servers"));
        assert!(msg.contains("no parser for type servers"));
    }

    #[test]
    fn missing_default_formats() {
        let err = FlagfigError::MissingDefaultValue("db".into());
        assert_eq!(err.to_string(), "Flag 'db' default value not provided");
    }

    #[test]
    fn usage_errors_are_distinct_from_structural_errors() {
        let usage = FlagfigError::InvalidValue {
            flag: "port".into(),
            value: "abc".into(),
            reason: "invalid digit".into(),
        };
        assert!(usage.is_usage_error());
        assert!(!FlagfigError::DuplicateFlagName("x".into()).is_usage_error());
        assert!(!FlagfigError::MissingDefaultValue("db".into()).is_usage_error());
    }

    #[test]
    fn missing_parsers_are_soft() {
        let err = FlagfigError::MissingParsers(vec![FlagfigError::MissingParser {
            flag: "x".into(),
            semantic: SemanticType::Custom("t"),
        }]);
        assert!(err.is_soft());
        assert!(!FlagfigError::MissingDefaultValue("db".into()).is_soft());
    }
}
