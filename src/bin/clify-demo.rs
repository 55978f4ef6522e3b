//! Demo: bind a signature to the process arguments and print the bound locals.
//!
//! Without arguments a canned command line is used:
//!
//! ```text
//! clify-demo
//! clify-demo b c 0 p1 p2 --y=1 --w 10 --k=hellothere
//! clify-demo --help
//! ```

use anyhow::Result;
use clify::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const DEFAULT_CL_ARGS: &str = "b c 0 p1 p2 --y=1 --w 10 --k=hellothere";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let signature = Signature::new("f3")
        .param("a")
        .param("b")
        .param("c")
        .param_default("x", 20)
        .var_positional("p")
        .keyword_only("y", 1)
        .keyword_only("z", 0)
        .var_keyword("kwargs");

    let mut options = BinderOptions::new().verbose(true).collect_extra(true);
    if std::env::args().len() <= 1 {
        options = options.cl_args(DEFAULT_CL_ARGS);
    }

    let binder = FunctionBinder::new(signature, BoundArguments::into_map, options)?;

    let call = CallArgs::default().arg(json!(["a"])).kwarg("z", json!(["z"]));
    let locals = binder.call(call).map_err(BindError::exit_if_help)?;

    println!("Locals:");
    println!("{}", serde_json::to_string_pretty(&locals)?);
    Ok(())
}
