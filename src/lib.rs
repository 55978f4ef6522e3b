//! Clify - command-line surfaces from signatures and fields
//!
//! Clify turns a callable's declared signature, or the public fields of an
//! object or mapping, into command-line options. Option types are inferred
//! from default values, command-line values are merged with programmatic
//! ones, and the result is dispatched to the target.
//!
//! - **`binding`** - descriptors, surface builder, extra-token lexer, merger and binders
//! - **`observability`** - verbose call diagnostics through `tracing`
//! - **`config`** - binder settings from TOML/JSON files
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! clify = { version = "0.3", features = ["config"] }
//! ```
//!
//! # Example: binding a function
//!
//! ```
//! use clify::prelude::*;
//!
//! let sig = Signature::new("f").param("a").param_default("x", 20);
//! let binder = FunctionBinder::new(sig, |args: BoundArguments| args.into_map(),
//!     BinderOptions::new().cl_args("--x=0"))
//! .unwrap();
//!
//! let locals = binder.call(CallArgs::default().arg("a")).unwrap();
//! assert_eq!(locals["x"], 0);
//! ```
//!
//! # Example: binding an object
//!
//! ```
//! use clify::prelude::*;
//!
//! #[derive(Clone)]
//! struct Settings {
//!     x: i64,
//!     y: String,
//! }
//!
//! clify::fields!(Settings { x, y });
//!
//! let settings = Settings { x: 0, y: "temp".into() };
//! let binder = ObjectBinder::new(settings, "Settings",
//!     BinderOptions::new().cl_args("--x=2 --y 3"))
//! .unwrap();
//!
//! let updated = binder.mutate(CallArgs::default()).unwrap();
//! assert_eq!(updated.x, 2);
//! assert_eq!(updated.y, "3");
//! ```

#![warn(missing_docs)]

/// Argument binding engine
pub mod binding;

/// Verbose call diagnostics
pub mod observability;

/// Binder configuration files (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binding::{
        BindError, BindResult, BinderOptions, BoundArguments, CallArgs, FieldRegistry,
        FunctionBinder, MappingBinder, ObjectBinder, Signature,
    };

    #[cfg(feature = "config")]
    pub use crate::config::BinderConfig;
}
