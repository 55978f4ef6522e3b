//! Surface builder - registers descriptors as options on a clap Command
//!
//! Every descriptor becomes one `--name` option whose absence is reported as
//! `None`, so "not given" stays distinct from "given and equal to the default".
//! A multi-value positional slot captures free tokens. Tokens that match no
//! registered option are split off before clap sees them and handed back as
//! leftovers.

use super::coerce::Coercion;
use super::descriptor::{ParameterDescriptor, POSITIONAL_SLOT};
use super::error::{BindError, BindResult};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One registered option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    /// Descriptor name, also the clap argument id
    pub name: String,

    /// Long flag without the leading dashes (underscores normalized to dashes)
    pub flag: String,

    /// Alternative long spellings
    pub aliases: Vec<String>,

    /// Coercion applied to the option's value
    pub coercion: Coercion,
}

/// Builds an [`ArgumentSurface`] on a fresh or an existing clap Command
pub struct SurfaceBuilder {
    command: Command,
    fresh: bool,
    about: Option<String>,
    allow_abbrev: bool,
    dash_aliases: bool,
}

impl SurfaceBuilder {
    /// Fresh parsing context for the named program
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            command: Command::new(prog.into()),
            fresh: true,
            about: None,
            allow_abbrev: true,
            dash_aliases: true,
        }
    }

    /// Extend an externally supplied parsing context
    pub fn extend(command: Command) -> Self {
        Self {
            command,
            fresh: false,
            about: None,
            allow_abbrev: true,
            dash_aliases: true,
        }
    }

    /// Help banner; a fresh context gets a generated one when unset
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Honor unambiguous prefixes of long flags
    pub fn allow_abbrev(mut self, allow: bool) -> Self {
        self.allow_abbrev = allow;
        self
    }

    /// Also accept the underscore spelling of dashed flags
    pub fn dash_aliases(mut self, enabled: bool) -> Self {
        self.dash_aliases = enabled;
        self
    }

    /// Register `descriptors` for the named target.
    ///
    /// `positional_limit` is the number of leading descriptors that free
    /// positional tokens may be aligned with.
    pub fn build(
        self,
        target: &str,
        descriptors: Vec<ParameterDescriptor>,
        positional_limit: usize,
    ) -> BindResult<ArgumentSurface> {
        let mut command = self.command;

        if let Some(about) = self.about {
            command = command.about(about);
        } else if self.fresh {
            command = command.about(format!(
                "Automatically generated argument parser for {}.",
                target
            ));
        }

        let existing_ids: HashSet<String> = command
            .get_arguments()
            .map(|a| a.get_id().to_string())
            .collect();
        let mut spellings: HashSet<String> = command
            .get_arguments()
            .flat_map(|a| {
                a.get_long()
                    .into_iter()
                    .chain(a.get_all_aliases().unwrap_or_default())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if !command.is_disable_help_flag_set() {
            spellings.insert("help".to_string());
        }

        let mut options = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if existing_ids.contains(&descriptor.name) {
                return Err(BindError::config(format!(
                    "option '{}' is already registered on this parser",
                    descriptor.name
                )));
            }

            let spec = Self::option_spec(descriptor, self.dash_aliases);
            for spelling in std::iter::once(&spec.flag).chain(spec.aliases.iter()) {
                if !spellings.insert(spelling.clone()) {
                    return Err(BindError::config(format!(
                        "flag '--{}' for parameter '{}' clashes with another option",
                        spelling, descriptor.name
                    )));
                }
            }

            command = command.arg(Self::build_arg(&spec));
            options.push(spec);
        }

        if !existing_ids.contains(POSITIONAL_SLOT) {
            command = command.arg(
                Arg::new(POSITIONAL_SLOT)
                    .value_name("ARGS")
                    .help("Positional arguments")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .allow_negative_numbers(true)
                    .value_parser(clap::value_parser!(String)),
            );
        }

        command = command
            .args_override_self(true)
            .infer_long_args(self.allow_abbrev);

        // flags are read from a finalized copy so the command itself stays extensible
        let mut built = command.clone();
        built.build();
        let flags = KnownFlags::from_command(&built);

        debug!(
            target_name = target,
            options = options.len(),
            flags = ?options.iter().map(|o| o.flag.as_str()).collect::<Vec<_>>(),
            "built argument surface"
        );

        Ok(ArgumentSurface {
            target: target.to_string(),
            descriptors,
            options,
            positional_limit,
            command,
            flags,
            allow_abbrev: self.allow_abbrev,
        })
    }

    fn option_spec(descriptor: &ParameterDescriptor, dash_aliases: bool) -> OptionSpec {
        let flag = descriptor.name.replace('_', "-");
        let aliases = if dash_aliases && flag != descriptor.name {
            vec![descriptor.name.clone()]
        } else {
            Vec::new()
        };

        OptionSpec {
            name: descriptor.name.clone(),
            flag,
            aliases,
            coercion: descriptor.coercion(),
        }
    }

    fn build_arg(spec: &OptionSpec) -> Arg {
        Arg::new(spec.name.clone())
            .long(spec.flag.clone())
            .aliases(spec.aliases.clone())
            .help(spec.coercion.type_name())
            .action(ArgAction::Set)
            .num_args(1)
            .allow_hyphen_values(true)
            .value_parser(clap::value_parser!(String))
    }
}

/// Flags the underlying parser recognizes, for splitting off leftover tokens
#[derive(Debug, Clone, Default)]
struct KnownFlags {
    /// long spelling -> (argument id, takes a value)
    longs: HashMap<String, (String, bool)>,
    /// short flag -> takes a value
    shorts: HashMap<char, bool>,
}

enum LongMatch {
    Known(bool),
    Ambiguous,
    Unknown,
}

impl KnownFlags {
    fn from_command(command: &Command) -> Self {
        let mut flags = KnownFlags::default();
        for arg in command.get_arguments().filter(|a| !a.is_positional()) {
            let takes_value = arg.get_action().takes_values();
            let id = arg.get_id().to_string();
            for long in arg
                .get_long()
                .into_iter()
                .chain(arg.get_all_aliases().unwrap_or_default())
            {
                flags
                    .longs
                    .insert(long.to_string(), (id.clone(), takes_value));
            }
            for short in arg
                .get_short()
                .into_iter()
                .chain(arg.get_all_short_aliases().unwrap_or_default())
            {
                flags.shorts.insert(short, takes_value);
            }
        }
        flags
    }

    fn match_long(&self, name: &str, allow_abbrev: bool) -> LongMatch {
        if let Some((_, takes_value)) = self.longs.get(name) {
            return LongMatch::Known(*takes_value);
        }
        if !allow_abbrev || name.is_empty() {
            return LongMatch::Unknown;
        }

        let candidates: HashMap<&str, bool> = self
            .longs
            .iter()
            .filter(|(long, _)| long.starts_with(name))
            .map(|(_, (id, takes_value))| (id.as_str(), *takes_value))
            .collect();

        match candidates.len() {
            0 => LongMatch::Unknown,
            1 => LongMatch::Known(candidates.into_values().all(|t| t)),
            _ => LongMatch::Ambiguous,
        }
    }
}

/// Options registered for one target, plus the parser they live on
#[derive(Debug, Clone)]
pub struct ArgumentSurface {
    target: String,
    descriptors: Vec<ParameterDescriptor>,
    options: Vec<OptionSpec>,
    positional_limit: usize,
    command: Command,
    flags: KnownFlags,
    allow_abbrev: bool,
}

/// Result of parsing one token list against a surface
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    /// Free positional tokens, raw
    pub positionals: Vec<String>,

    /// Every registered option in descriptor order; `None` when not given on the command line
    pub keywords: Vec<(String, Option<Value>)>,

    /// Tokens matching no registered option
    pub leftover: Vec<String>,

    /// Raw matches, for options registered by a composed surface
    pub matches: ArgMatches,
}

impl ArgumentSurface {
    /// Name of the bound target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Descriptors in declaration order
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Registered options in declaration order
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Number of leading descriptors free positional tokens align with
    pub fn positional_limit(&self) -> usize {
        self.positional_limit
    }

    /// The underlying parser
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Hand the parser over, e.g. to extend it with another surface
    pub fn into_command(self) -> Command {
        self.command
    }

    /// Rendered help text
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Split `tokens` into those the parser recognizes and leftovers.
    ///
    /// A bare token right after an unrecognized `--key` (without `=`) is kept
    /// with it as its value.
    pub fn split_known<S: AsRef<str>>(&self, tokens: &[S]) -> (Vec<String>, Vec<String>) {
        let mut recognized = Vec::new();
        let mut leftover = Vec::new();
        let mut iter = tokens.iter().map(|t| t.as_ref().to_string()).peekable();

        while let Some(token) = iter.next() {
            if token == "--" {
                recognized.push(token);
                recognized.extend(iter.by_ref());
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (body, false),
                };

                match self.flags.match_long(name, self.allow_abbrev) {
                    LongMatch::Known(takes_value) => {
                        recognized.push(token.clone());
                        if takes_value && !inline {
                            recognized.extend(iter.next());
                        }
                    }
                    // the parser reports the ambiguity
                    LongMatch::Ambiguous => recognized.push(token.clone()),
                    LongMatch::Unknown => {
                        leftover.push(token.clone());
                        if !inline && iter.peek().is_some_and(|next| !next.starts_with("--")) {
                            leftover.extend(iter.next());
                        }
                    }
                }
            } else if token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err() {
                let short = token.chars().nth(1);
                match short.and_then(|c| self.flags.shorts.get(&c)) {
                    Some(takes_value) => {
                        let bare = token.chars().count() == 2;
                        recognized.push(token);
                        if *takes_value && bare {
                            recognized.extend(iter.next());
                        }
                    }
                    None => leftover.push(token),
                }
            } else {
                recognized.push(token);
            }
        }

        (recognized, leftover)
    }

    /// Parse `tokens` (program name excluded) into positionals, coerced keywords and leftovers
    pub fn parse_known<S: AsRef<str>>(&self, tokens: &[S]) -> BindResult<ParsedArgs> {
        let (recognized, leftover) = self.split_known(tokens);
        debug!(?recognized, ?leftover, "split command-line tokens");

        let bin = self
            .command
            .get_bin_name()
            .unwrap_or_else(|| self.command.get_name())
            .to_string();
        let matches = self
            .command
            .clone()
            .try_get_matches_from(std::iter::once(bin).chain(recognized))?;

        let positionals = matches
            .get_many::<String>(POSITIONAL_SLOT)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let mut keywords = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let value = match matches.get_one::<String>(&option.name) {
                Some(raw) => Some(coerce_option(option, raw)?),
                None => None,
            };
            keywords.push((option.name.clone(), value));
        }

        Ok(ParsedArgs {
            positionals,
            keywords,
            leftover,
            matches,
        })
    }
}

fn coerce_option(option: &OptionSpec, raw: &str) -> BindResult<Value> {
    option
        .coercion
        .apply(raw)
        .map_err(|e| BindError::TypeCoercion {
            value: raw.to_string(),
            target: option.coercion.type_name(),
            param: option.name.clone(),
            source: Box::new(e),
        })
}
