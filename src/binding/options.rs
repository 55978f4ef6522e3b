//! Binder options shared by every binder flavor

use super::builder::SurfaceBuilder;
use super::error::BindResult;
use super::lexer::LexPolicy;
use super::merge::MergeMode;

/// Flags controlling surface construction, merging and dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderOptions {
    /// Log the merged arguments before dispatch
    pub verbose: bool,

    /// Collect unrecognized `--key value` pairs as extra keywords
    pub collect_extra: bool,

    /// Fail on any unrecognized token
    pub strict: bool,

    /// How the extra-token lexer treats stray tokens
    pub lex_policy: LexPolicy,

    /// Honor unambiguous prefixes of long flags
    pub allow_abbrev: bool,

    /// Accept the underscore spelling of dashed flags
    pub dash_aliases: bool,

    /// Program name shown in usage; defaults to the target name
    pub prog: Option<String>,

    /// Help banner; defaults to a generated one
    pub about: Option<String>,

    /// Whitespace-separated tokens used instead of the process arguments
    pub cl_args: Option<String>,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            collect_extra: false,
            strict: false,
            lex_policy: LexPolicy::Lenient,
            allow_abbrev: true,
            dash_aliases: true,
            prog: None,
            about: None,
            cl_args: None,
        }
    }
}

impl BinderOptions {
    /// Options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Log merged arguments before dispatch
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Collect unrecognized options as extra keywords
    pub fn collect_extra(mut self, collect: bool) -> Self {
        self.collect_extra = collect;
        self
    }

    /// Reject unrecognized options
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Stray token policy for the extra-token lexer
    pub fn lex_policy(mut self, policy: LexPolicy) -> Self {
        self.lex_policy = policy;
        self
    }

    /// Toggle flag-prefix matching
    pub fn allow_abbrev(mut self, allow: bool) -> Self {
        self.allow_abbrev = allow;
        self
    }

    /// Toggle underscore aliases
    pub fn dash_aliases(mut self, enabled: bool) -> Self {
        self.dash_aliases = enabled;
        self
    }

    /// Program name for usage text
    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    /// Help banner
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Parse these tokens instead of the process arguments
    pub fn cl_args(mut self, cl_args: impl Into<String>) -> Self {
        self.cl_args = Some(cl_args.into());
        self
    }

    /// Leftover-token handling
    pub fn mode(&self) -> MergeMode {
        MergeMode {
            collect_extra: self.collect_extra,
            strict: self.strict,
            lex_policy: self.lex_policy,
        }
    }

    /// Reject contradictory flags
    pub fn validate(&self) -> BindResult<()> {
        self.mode().validate()
    }

    /// Tokens to parse: the override string, or the process arguments without the program name
    pub fn tokens(&self) -> Vec<String> {
        match &self.cl_args {
            Some(cl_args) => cl_args.split_whitespace().map(str::to_string).collect(),
            None => std::env::args().skip(1).collect(),
        }
    }

    /// Surface builder configured by these options
    pub(crate) fn surface_builder(
        &self,
        target: &str,
        base: Option<clap::Command>,
    ) -> SurfaceBuilder {
        let mut builder = match base {
            Some(command) => SurfaceBuilder::extend(command),
            None => SurfaceBuilder::new(self.prog.clone().unwrap_or_else(|| target.to_string())),
        };
        if let Some(about) = &self.about {
            builder = builder.about(about.clone());
        }
        builder
            .allow_abbrev(self.allow_abbrev)
            .dash_aliases(self.dash_aliases)
    }
}
