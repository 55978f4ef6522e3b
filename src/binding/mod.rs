//! Argument binding engine
//!
//! Turns a declared signature, or the fields of an object or mapping, into
//! command-line options and merges what the command line supplies with what
//! the caller passes programmatically.
//!
//! ## Flow
//!
//! - **Introspection**: [`Signature`], [`FieldRegistry`] and mapping views
//!   produce an ordered list of [`ParameterDescriptor`]s
//! - **Surface**: [`SurfaceBuilder`] registers one `--name` option per
//!   descriptor on a clap `Command`, typed by the descriptor's default
//! - **Extras**: [`lex_extra`] reads leftover `--key value` pairs
//! - **Merge**: [`Merger`] reconciles programmatic, command-line and extra
//!   arguments, then a binder dispatches
//!
//! ## Usage
//!
//! ```rust
//! use clify::binding::{BinderOptions, BoundArguments, CallArgs, FunctionBinder, Signature};
//!
//! let sig = Signature::new("greet").param("name").param_default("times", 1);
//! let greet = FunctionBinder::new(sig, |args: BoundArguments| {
//!     let name: String = args.get_as("name").unwrap();
//!     let times: i64 = args.get_as("times").unwrap();
//!     vec![name; times as usize].join(" ")
//! }, BinderOptions::new().cl_args("--times 2"))
//! .unwrap();
//!
//! assert_eq!(greet.call(CallArgs::default().arg("hi")).unwrap(), "hi hi");
//! ```

pub mod builder;
pub mod coerce;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod fields;
pub mod lexer;
pub mod merge;
pub mod options;
pub mod resolve;

// Re-export main types
pub use builder::{ArgumentSurface, OptionSpec, ParsedArgs, SurfaceBuilder};
pub use coerce::{Coercion, CoercionFailure, FALSE_TOKENS};
pub use descriptor::{DefaultValue, ParameterDescriptor, Signature, POSITIONAL_SLOT};
pub use error::{BindError, BindResult};
pub use executor::{FunctionBinder, MappingBinder, ObjectBinder};
pub use fields::{Field, FieldRegistry};
pub use lexer::{lex_extra, LexPolicy};
pub use merge::{CallArgs, MergeMode, Merger};
pub use options::BinderOptions;
pub use resolve::BoundArguments;
