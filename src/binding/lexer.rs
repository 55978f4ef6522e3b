//! Lexer for leftover command-line tokens
//!
//! Tokens that match no registered option are read as `--key value` or
//! `--key=value` pairs. The last occurrence of a key wins.

use super::error::{BindError, BindResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const OPTION_PREFIX: &str = "--";

/// What to do with a bare token that is neither an option nor a pending option's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexPolicy {
    /// Skip it
    #[default]
    Lenient,
    /// Reject it as malformed
    Strict,
}

/// Tokenize leftover tokens into a key to raw-string mapping
pub fn lex_extra<S: AsRef<str>>(tokens: &[S], policy: LexPolicy) -> BindResult<Map<String, Value>> {
    let mut extra = Map::new();
    let mut pending: Option<&str> = None;

    for token in tokens {
        let token: &str = token.as_ref();
        match pending.take() {
            None => match token.strip_prefix(OPTION_PREFIX) {
                Some(option) => {
                    if let Some((key, value)) = option.split_once('=') {
                        extra.insert(option_name(key, token)?.to_string(), Value::from(value));
                    } else {
                        pending = Some(option_name(option, token)?);
                    }
                }
                None => match policy {
                    LexPolicy::Lenient => debug!(token, "ignoring stray extra token"),
                    LexPolicy::Strict => {
                        return Err(BindError::malformed(format!(
                            "expected a token beginning with {}, got {:?}",
                            OPTION_PREFIX, token
                        )));
                    }
                },
            },
            Some(key) => {
                if token.starts_with(OPTION_PREFIX) {
                    return Err(BindError::malformed(format!(
                        "expected a value for option '{}', got {:?}",
                        key, token
                    )));
                }
                extra.insert(key.to_string(), Value::from(token));
            }
        }
    }

    if let Some(key) = pending {
        return Err(BindError::malformed(format!(
            "expected a value for option '{}', none provided",
            key
        )));
    }

    Ok(extra)
}

fn option_name<'a>(name: &'a str, token: &str) -> BindResult<&'a str> {
    if name.is_empty() {
        Err(BindError::malformed(format!("option without a name: {:?}", token)))
    } else {
        Ok(name)
    }
}
