//! Configuration files for binders.
//!
//! # Example
//!
//! ```no_run
//! use clify::config::BinderConfig;
//!
//! let options = BinderConfig::from_file("clify.toml")
//!     .and_then(BinderConfig::into_options)
//!     .unwrap();
//! println!("collect extra: {}", options.collect_extra);
//! ```

#[allow(clippy::module_inception)]
pub mod config;

pub use self::config::BinderConfig;
