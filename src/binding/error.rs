//! Error types for argument binding

use super::coerce::CoercionFailure;
use thiserror::Error;

/// Result type for binding operations
pub type BindResult<T> = Result<T, BindError>;

/// Errors that can occur while building a surface, merging arguments or dispatching
#[derive(Debug, Error)]
pub enum BindError {
    /// Invalid binder configuration (conflicting modes, reserved names)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A command-line string could not be converted to the parameter's type
    #[error("Cannot convert {value:?} to type '{target}' for parameter '{param}'")]
    TypeCoercion {
        /// Raw token supplied on the command line
        value: String,
        /// Name of the type implied by the parameter's default
        target: &'static str,
        /// Parameter the token was bound to
        param: String,
        /// Underlying conversion failure
        #[source]
        source: Box<CoercionFailure>,
    },

    /// Leftover command-line tokens do not form `--key value` / `--key=value` pairs
    #[error("Malformed extra argument: {0}")]
    MalformedExtraArgument(String),

    /// The same keyword was supplied programmatically, on the command line and as an extra
    #[error("Got multiple values for argument(s): {}", keys.join(", "))]
    Conflict {
        /// Keys present in all three sources
        keys: Vec<String>,
    },

    /// Strict mode rejected unrecognized command-line options
    #[error("Unrecognized argument(s) in strict mode: {}", keys.join(", "))]
    StrictModeViolation {
        /// Unexpected option names
        keys: Vec<String>,
    },

    /// Dispatch to the target failed
    #[error("Execution error: {0}")]
    Execution(String),

    /// Merged arguments do not fit the target's signature
    #[error("{target}() {message}")]
    Resolution {
        /// Name of the callable
        target: String,
        /// What went wrong
        message: String,
    },

    /// Error reported by the underlying command-line parser
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    /// Create a configuration error with context
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an execution error with context
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a malformed extra argument error with context
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedExtraArgument(msg.into())
    }

    /// Create a resolution error for the named target
    pub fn resolution<T: Into<String>, S: Into<String>>(target: T, msg: S) -> Self {
        Self::Resolution {
            target: target.into(),
            message: msg.into(),
        }
    }

    /// Whether this error is the parser asking to display help or version text
    pub fn is_help(&self) -> bool {
        match self {
            Self::Cli(e) => matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ),
            _ => false,
        }
    }

    /// Let the parser print help/usage and exit the process when this is a help request.
    ///
    /// Any other error is handed back unchanged.
    pub fn exit_if_help(self) -> Self {
        match self {
            err if err.is_help() => match err {
                Self::Cli(e) => e.exit(),
                other => other,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_conflict_message_lists_keys() {
        let err = BindError::Conflict {
            keys: vec!["k".to_string(), "z".to_string()],
        };
        assert_eq!(err.to_string(), "Got multiple values for argument(s): k, z");
    }

    #[test]
    fn test_type_coercion_keeps_cause() {
        let cause = "abc".parse::<i64>().unwrap_err();
        let err = BindError::TypeCoercion {
            value: "abc".to_string(),
            target: "int",
            param: "x".to_string(),
            source: Box::new(CoercionFailure::Int(cause)),
        };

        assert!(err.to_string().contains("\"abc\""));
        assert!(err.to_string().contains("'int'"));
        assert!(err.to_string().contains("'x'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_resolution_message() {
        let err = BindError::resolution("f", "missing required argument: 'a'");
        assert_eq!(err.to_string(), "f() missing required argument: 'a'");
        assert!(!err.is_help());
    }
}
