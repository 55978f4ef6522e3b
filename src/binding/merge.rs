//! Merger - reconciles programmatic, command-line and extra arguments
//!
//! Precedence for keywords is extra > command line > programmatic. A key given
//! in all three sources is a conflict; in two of them the higher source wins.
//! Positionals are the programmatic ones followed by the command-line ones.

use super::builder::{ArgumentSurface, ParsedArgs};
use super::coerce::Coercion;
use super::error::{BindError, BindResult};
use super::lexer::{lex_extra, LexPolicy};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Final arguments a target is dispatched with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    /// Positional arguments
    pub args: Vec<Value>,

    /// Keyword arguments
    pub kwargs: Map<String, Value>,
}

impl CallArgs {
    /// Programmatic positionals only
    pub fn positional<I: IntoIterator<Item = Value>>(args: I) -> Self {
        Self {
            args: args.into_iter().collect(),
            kwargs: Map::new(),
        }
    }

    /// Add a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// How leftover command-line tokens are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeMode {
    /// Collect leftover `--key value` pairs as extra keywords
    pub collect_extra: bool,

    /// Reject any leftover token
    pub strict: bool,

    /// Lexer policy for stray tokens when collecting extras
    pub lex_policy: LexPolicy,
}

impl MergeMode {
    /// Reject contradictory modes
    pub fn validate(&self) -> BindResult<()> {
        if self.collect_extra && self.strict {
            return Err(BindError::config(
                "collect_extra and strict cannot both be enabled",
            ));
        }
        Ok(())
    }
}

/// Merges one bind call's provenances against a surface
pub struct Merger<'a> {
    surface: &'a ArgumentSurface,
    mode: MergeMode,
}

impl<'a> Merger<'a> {
    /// Create a merger; fails on contradictory modes
    pub fn new(surface: &'a ArgumentSurface, mode: MergeMode) -> BindResult<Self> {
        mode.validate()?;
        Ok(Self { surface, mode })
    }

    /// Reconcile programmatic arguments with a parse result
    pub fn merge(&self, programmatic: CallArgs, parsed: ParsedArgs) -> BindResult<CallArgs> {
        let CallArgs { mut args, kwargs } = programmatic;

        let cli_args = self.coerce_positionals(args.len(), &parsed.positionals)?;

        let cli_kwargs: Map<String, Value> = parsed
            .keywords
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        let extra = self.extra_keywords(&parsed.leftover)?;

        let overlap: Vec<String> = kwargs
            .keys()
            .filter(|k| cli_kwargs.contains_key(*k) && extra.contains_key(*k))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(BindError::Conflict { keys: overlap });
        }

        let mut merged = kwargs;
        merged.extend(cli_kwargs);
        merged.extend(extra);

        args.extend(cli_args);

        Ok(CallArgs {
            args,
            kwargs: merged,
        })
    }

    /// Coerce command-line positionals by the descriptor each one lines up with.
    ///
    /// The token at index `i` is governed by descriptor `offset + i`. Tokens
    /// past the positional descriptors, and tokens governed by keyword-only or
    /// default-less descriptors, stay raw.
    pub fn coerce_positionals(&self, offset: usize, tokens: &[String]) -> BindResult<Vec<Value>> {
        let descriptors = self.surface.descriptors();
        let limit = self.surface.positional_limit().min(descriptors.len());

        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let index = offset + i;
                let Some(descriptor) = descriptors[..limit].get(index) else {
                    return Ok(Value::String(token.clone()));
                };

                let coercion = descriptor.positional_coercion();
                if coercion == Coercion::Raw {
                    return Ok(Value::String(token.clone()));
                }
                coercion.apply(token).map_err(|e| BindError::TypeCoercion {
                    value: token.clone(),
                    target: coercion.type_name(),
                    param: descriptor.name.clone(),
                    source: Box::new(e),
                })
            })
            .collect()
    }

    fn extra_keywords(&self, leftover: &[String]) -> BindResult<Map<String, Value>> {
        if self.mode.collect_extra {
            return lex_extra(leftover, self.mode.lex_policy);
        }

        if self.mode.strict {
            if leftover.is_empty() {
                return Ok(Map::new());
            }
            return Err(BindError::StrictModeViolation {
                keys: unexpected_keys(leftover),
            });
        }

        if !leftover.is_empty() {
            debug!(?leftover, "dropping unrecognized command-line tokens");
        }
        Ok(Map::new())
    }
}

/// Option names among leftover tokens, or the raw tokens when none look like options
fn unexpected_keys(leftover: &[String]) -> Vec<String> {
    let keys: BTreeSet<String> = leftover
        .iter()
        .filter(|t| t.starts_with('-'))
        .map(|t| {
            let name = t.trim_start_matches('-');
            name.split_once('=').map_or(name, |(k, _)| k).to_string()
        })
        .collect();

    if keys.is_empty() {
        leftover.to_vec()
    } else {
        keys.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::builder::SurfaceBuilder;
    use crate::binding::descriptor::Signature;
    use serde_json::json;

    fn f() -> ArgumentSurface {
        let sig = Signature::new("f")
            .param("a")
            .param("b")
            .param_default("x", 20)
            .param_default("ratio", 0.5)
            .var_positional("p")
            .keyword_only("y", 1)
            .keyword_only("k", "default")
            .var_keyword("kwargs");
        SurfaceBuilder::new("f")
            .build("f", sig.descriptors().unwrap(), sig.positional_count())
            .unwrap()
    }

    fn collect() -> MergeMode {
        MergeMode {
            collect_extra: true,
            ..MergeMode::default()
        }
    }

    fn run(mode: MergeMode, programmatic: CallArgs, tokens: &[&str]) -> BindResult<CallArgs> {
        let surface = f();
        let parsed = surface.parse_known(tokens)?;
        Merger::new(&surface, mode)?.merge(programmatic, parsed)
    }

    #[test]
    fn test_modes_are_exclusive() {
        let surface = f();
        let mode = MergeMode {
            collect_extra: true,
            strict: true,
            ..MergeMode::default()
        };
        assert!(matches!(
            Merger::new(&surface, mode),
            Err(BindError::Configuration(_))
        ));
    }

    #[test]
    fn test_positionals_follow_programmatic_and_are_coerced() {
        let call = run(
            MergeMode::default(),
            CallArgs::positional([json!(["a"])]),
            &["b", "0", "2.5", "p1", "p2"],
        )
        .unwrap();

        assert_eq!(
            call.args,
            vec![json!(["a"]), json!("b"), json!(0), json!(2.5), json!("p1"), json!("p2")]
        );
    }

    #[test]
    fn test_positional_coercion_error() {
        let err = run(MergeMode::default(), CallArgs::default(), &["a", "b", "twenty"]).unwrap_err();
        match err {
            BindError::TypeCoercion { value, target, param, .. } => {
                assert_eq!(value, "twenty");
                assert_eq!(target, "int");
                assert_eq!(param, "x");
            }
            other => panic!("Expected coercion error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_provided_options_are_filtered() {
        let call = run(MergeMode::default(), CallArgs::default(), &["--y", "5"]).unwrap();
        assert_eq!(call.kwargs.len(), 1);
        assert_eq!(call.kwargs["y"], json!(5));
    }

    #[test]
    fn test_extra_dropped_by_default() {
        let call = run(MergeMode::default(), CallArgs::default(), &["--q", "1"]).unwrap();
        assert!(call.kwargs.is_empty());
    }

    #[test]
    fn test_extra_collected() {
        let call = run(collect(), CallArgs::default(), &["--q", "1", "--s=t"]).unwrap();
        assert_eq!(call.kwargs["q"], json!("1"));
        assert_eq!(call.kwargs["s"], json!("t"));
    }

    #[test]
    fn test_strict_rejects_leftovers() {
        let mode = MergeMode {
            strict: true,
            ..MergeMode::default()
        };
        let err = run(mode, CallArgs::default(), &["--q", "1", "--s=t"]).unwrap_err();
        match err {
            BindError::StrictModeViolation { keys } => assert_eq!(keys, vec!["q", "s"]),
            other => panic!("Expected strict violation, got {:?}", other),
        }

        assert!(run(mode, CallArgs::default(), &["--y", "2"]).is_ok());
    }

    #[test]
    fn test_conflict_requires_all_three_sources() {
        // without the underscore alias, `--max_count` is left over and lexed as an extra
        let sig = Signature::new("g").param_default("max_count", 1).var_keyword("kw");
        let surface = SurfaceBuilder::new("g")
            .dash_aliases(false)
            .build("g", sig.descriptors().unwrap(), 1)
            .unwrap();
        let merger = Merger::new(&surface, collect()).unwrap();
        let tokens = ["--max-count", "2", "--max_count=3"];

        let parsed = surface.parse_known(&tokens).unwrap();
        let err = merger
            .merge(CallArgs::default().kwarg("max_count", 9), parsed)
            .unwrap_err();
        assert!(matches!(err, BindError::Conflict { ref keys } if keys == &vec!["max_count".to_string()]));

        let parsed = surface.parse_known(&tokens).unwrap();
        let call = merger.merge(CallArgs::default(), parsed).unwrap();
        assert_eq!(call.kwargs["max_count"], json!("3"));
    }

    #[test]
    fn test_two_source_precedence() {
        // programmatic + cli: cli wins
        let call = run(collect(), CallArgs::default().kwarg("y", 100), &["--y", "2"]).unwrap();
        assert_eq!(call.kwargs["y"], json!(2));

        // programmatic + extra: extra wins
        let call = run(collect(), CallArgs::default().kwarg("q", 100), &["--q", "2"]).unwrap();
        assert_eq!(call.kwargs["q"], json!("2"));

        // programmatic only: untouched, never coerced
        let call = run(collect(), CallArgs::default().kwarg("y", json!(["z"])), &[]).unwrap();
        assert_eq!(call.kwargs["y"], json!(["z"]));
    }

    #[test]
    fn test_unexpected_keys() {
        let leftover = vec!["--a=1".to_string(), "-b".to_string(), "2".to_string()];
        assert_eq!(unexpected_keys(&leftover), vec!["a", "b"]);
    }
}
