//! Binders - the entry points tying introspection, parsing, merging and dispatch together
//!
//! - [`FunctionBinder`] binds a [`Signature`] and invokes a callable
//! - [`ObjectBinder`] binds a [`FieldRegistry`] type and returns a mutated copy or a mapping
//! - [`MappingBinder`] does the same for a JSON mapping
//!
//! The surface is built once at construction. Each call parses the tokens
//! fresh, so repeated calls with the same tokens give the same result.

use super::builder::ArgumentSurface;
use super::descriptor::{ParameterDescriptor, Signature};
use super::error::{BindError, BindResult};
use super::fields::{mapping_descriptors, object_descriptors, FieldRegistry};
use super::merge::{CallArgs, Merger};
use super::options::BinderOptions;
use super::resolve::BoundArguments;
use crate::observability::log_call;
use clap::Command;
use serde_json::{Map, Value};

/// Surface and options shared by every binder flavor
#[derive(Debug, Clone)]
struct BindCore {
    surface: ArgumentSurface,
    options: BinderOptions,
}

impl BindCore {
    fn new(
        target: &str,
        descriptors: Vec<ParameterDescriptor>,
        positional_limit: usize,
        options: BinderOptions,
        base: Option<Command>,
    ) -> BindResult<Self> {
        options.validate()?;
        let surface = options
            .surface_builder(target, base)
            .build(target, descriptors, positional_limit)?;
        Ok(Self { surface, options })
    }

    fn merge<S: AsRef<str>>(&self, programmatic: CallArgs, tokens: &[S]) -> BindResult<CallArgs> {
        let parsed = self.surface.parse_known(tokens)?;
        Merger::new(&self.surface, self.options.mode())?.merge(programmatic, parsed)
    }

    fn trace(&self, call: &CallArgs) {
        if self.options.verbose {
            log_call(self.surface.target(), call);
        }
    }

    /// Fold positionals onto descriptors in order, then overlay keywords
    fn fold(&self, call: CallArgs) -> BindResult<Map<String, Value>> {
        let descriptors = self.surface.descriptors();
        if call.args.len() > descriptors.len() {
            return Err(BindError::execution(format!(
                "{} takes {} positional values but {} were given",
                self.surface.target(),
                descriptors.len(),
                call.args.len()
            )));
        }

        let mut map: Map<String, Value> = descriptors
            .iter()
            .zip(call.args)
            .map(|(d, v)| (d.name.clone(), v))
            .collect();
        map.extend(call.kwargs);
        Ok(map)
    }
}

/// Binds a callable's signature to the command line and invokes it.
///
/// ```
/// use clify::binding::{BinderOptions, BoundArguments, CallArgs, FunctionBinder, Signature};
///
/// let sig = Signature::new("add").param_default("x", 1).param_default("y", 2);
/// let binder = FunctionBinder::new(sig, |args: BoundArguments| {
///     args.get_as::<i64>("x").unwrap() + args.get_as::<i64>("y").unwrap()
/// }, BinderOptions::new().cl_args("--y 40 2"))
/// .unwrap();
///
/// assert_eq!(binder.call(CallArgs::default()).unwrap(), 42);
/// ```
pub struct FunctionBinder<F> {
    signature: Signature,
    core: BindCore,
    target: F,
}

impl<F, R> FunctionBinder<F>
where
    F: Fn(BoundArguments) -> R,
{
    /// Build the surface for `signature` on a fresh parser
    pub fn new(signature: Signature, target: F, options: BinderOptions) -> BindResult<Self> {
        Self::build(signature, target, options, None)
    }

    /// Build the surface for `signature` on an existing parser
    pub fn extending(
        command: Command,
        signature: Signature,
        target: F,
        options: BinderOptions,
    ) -> BindResult<Self> {
        Self::build(signature, target, options, Some(command))
    }

    fn build(
        signature: Signature,
        target: F,
        options: BinderOptions,
        base: Option<Command>,
    ) -> BindResult<Self> {
        let core = BindCore::new(
            signature.name(),
            signature.descriptors()?,
            signature.positional_count(),
            options,
            base,
        )?;
        Ok(Self {
            signature,
            core,
            target,
        })
    }

    /// The registered surface
    pub fn surface(&self) -> &ArgumentSurface {
        &self.core.surface
    }

    /// The bound signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Merge programmatic arguments with the configured command-line tokens
    pub fn bind(&self, programmatic: CallArgs) -> BindResult<CallArgs> {
        self.bind_tokens(programmatic, &self.core.options.tokens())
    }

    /// Merge programmatic arguments with explicit tokens
    pub fn bind_tokens<S: AsRef<str>>(&self, programmatic: CallArgs, tokens: &[S]) -> BindResult<CallArgs> {
        self.core.merge(programmatic, tokens)
    }

    /// Bind and invoke the target
    pub fn call(&self, programmatic: CallArgs) -> BindResult<R> {
        self.call_tokens(programmatic, &self.core.options.tokens())
    }

    /// Bind explicit tokens and invoke the target
    pub fn call_tokens<S: AsRef<str>>(&self, programmatic: CallArgs, tokens: &[S]) -> BindResult<R> {
        let call = self.bind_tokens(programmatic, tokens)?;
        self.core.trace(&call);
        let bound = self.signature.resolve(&call)?;
        Ok((self.target)(bound))
    }
}

/// Binds the public fields of an object to the command line.
///
/// Dispatch never touches the original: [`mutate`](Self::mutate) works on a
/// copy and [`to_map`](Self::to_map) only returns the merged values.
pub struct ObjectBinder<T> {
    target: T,
    core: BindCore,
}

impl<T: FieldRegistry> ObjectBinder<T> {
    /// Build the surface from `target`'s current field values
    pub fn new(target: T, name: impl Into<String>, options: BinderOptions) -> BindResult<Self> {
        Self::build(target, name.into(), options, None)
    }

    /// Build the surface on an existing parser
    pub fn extending(
        command: Command,
        target: T,
        name: impl Into<String>,
        options: BinderOptions,
    ) -> BindResult<Self> {
        Self::build(target, name.into(), options, Some(command))
    }

    fn build(target: T, name: String, options: BinderOptions, base: Option<Command>) -> BindResult<Self> {
        let descriptors = object_descriptors(&target)?;
        let limit = descriptors.len();
        let core = BindCore::new(&name, descriptors, limit, options, base)?;
        Ok(Self { target, core })
    }

    /// The registered surface
    pub fn surface(&self) -> &ArgumentSurface {
        &self.core.surface
    }

    /// The untouched original
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Merge programmatic arguments with the configured command-line tokens
    pub fn bind(&self, programmatic: CallArgs) -> BindResult<CallArgs> {
        self.core.merge(programmatic, &self.core.options.tokens())
    }

    /// Bind and write every merged value onto a copy of the target
    pub fn mutate(&self, programmatic: CallArgs) -> BindResult<T> {
        self.mutate_tokens(programmatic, &self.core.options.tokens())
    }

    /// Bind explicit tokens and write every merged value onto a copy of the target
    pub fn mutate_tokens<S: AsRef<str>>(&self, programmatic: CallArgs, tokens: &[S]) -> BindResult<T> {
        let call = self.core.merge(programmatic, tokens)?;
        self.core.trace(&call);
        let values = self.core.fold(call)?;

        let fields = T::fields();
        let mut copy = self.target.clone();
        for (name, value) in values {
            if T::methods().contains(&name.as_str()) {
                return Err(BindError::execution(format!(
                    "cannot overwrite method '{}' of {}",
                    name,
                    self.core.surface.target()
                )));
            }

            let result = match fields.iter().find(|f| f.name == name) {
                Some(field) => (field.set)(&mut copy, value),
                None => copy.set_extra(&name, value),
            };
            result.map_err(|e| {
                BindError::execution(format!("cannot set '{}' on {}: {}", name, self.core.surface.target(), e))
            })?;
        }
        Ok(copy)
    }

    /// Bind and return the merged values without touching the target
    pub fn to_map(&self, programmatic: CallArgs) -> BindResult<Map<String, Value>> {
        self.to_map_tokens(programmatic, &self.core.options.tokens())
    }

    /// Bind explicit tokens and return the merged values
    pub fn to_map_tokens<S: AsRef<str>>(
        &self,
        programmatic: CallArgs,
        tokens: &[S],
    ) -> BindResult<Map<String, Value>> {
        let call = self.core.merge(programmatic, tokens)?;
        self.core.trace(&call);
        self.core.fold(call)
    }
}

/// Binds the public keys of a mapping to the command line
pub struct MappingBinder {
    source: Map<String, Value>,
    core: BindCore,
}

impl MappingBinder {
    /// Build the surface from the mapping's current values
    pub fn new(source: Map<String, Value>, name: impl Into<String>, options: BinderOptions) -> BindResult<Self> {
        Self::build(source, name.into(), options, None)
    }

    /// Build the surface on an existing parser
    pub fn extending(
        command: Command,
        source: Map<String, Value>,
        name: impl Into<String>,
        options: BinderOptions,
    ) -> BindResult<Self> {
        Self::build(source, name.into(), options, Some(command))
    }

    fn build(
        source: Map<String, Value>,
        name: String,
        options: BinderOptions,
        base: Option<Command>,
    ) -> BindResult<Self> {
        let descriptors = mapping_descriptors(&source)?;
        let limit = descriptors.len();
        let core = BindCore::new(&name, descriptors, limit, options, base)?;
        Ok(Self { source, core })
    }

    /// The registered surface
    pub fn surface(&self) -> &ArgumentSurface {
        &self.core.surface
    }

    /// The untouched original
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// Merge programmatic arguments with the configured command-line tokens
    pub fn bind(&self, programmatic: CallArgs) -> BindResult<CallArgs> {
        self.core.merge(programmatic, &self.core.options.tokens())
    }

    /// Bind and return a fresh mapping: the original overlaid with every merged value
    pub fn mutate(&self, programmatic: CallArgs) -> BindResult<Map<String, Value>> {
        self.mutate_tokens(programmatic, &self.core.options.tokens())
    }

    /// Bind explicit tokens and return a fresh, updated mapping
    pub fn mutate_tokens<S: AsRef<str>>(
        &self,
        programmatic: CallArgs,
        tokens: &[S],
    ) -> BindResult<Map<String, Value>> {
        let values = self.to_map_tokens(programmatic, tokens)?;
        let mut fresh = self.source.clone();
        fresh.extend(values);
        Ok(fresh)
    }

    /// Bind and return only the merged values
    pub fn to_map(&self, programmatic: CallArgs) -> BindResult<Map<String, Value>> {
        self.to_map_tokens(programmatic, &self.core.options.tokens())
    }

    /// Bind explicit tokens and return only the merged values
    pub fn to_map_tokens<S: AsRef<str>>(
        &self,
        programmatic: CallArgs,
        tokens: &[S],
    ) -> BindResult<Map<String, Value>> {
        let call = self.core.merge(programmatic, tokens)?;
        self.core.trace(&call);
        self.core.fold(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq)]
    struct Job {
        name: String,
        retries: i64,
        dry_run: bool,
        tags: Option<String>,
    }

    impl Job {
        #[allow(dead_code)]
        fn run(&self) {}
    }

    crate::fields!(Job { name, retries, dry_run, tags } methods [run]);

    fn job() -> Job {
        Job {
            name: "nightly".to_string(),
            retries: 3,
            dry_run: false,
            tags: None,
        }
    }

    #[test]
    fn test_function_binder_invokes_target() {
        let sig = Signature::new("scale").param("value").param_default("factor", 2);
        let binder = FunctionBinder::new(
            sig,
            |args: BoundArguments| {
                let value: String = args.get_as("value").unwrap();
                let factor: i64 = args.get_as("factor").unwrap();
                format!("{}x{}", value, factor)
            },
            BinderOptions::new(),
        )
        .unwrap();

        assert_eq!(binder.call_tokens(CallArgs::default(), &["7", "3"]).unwrap(), "7x3");
        assert_eq!(
            binder.call_tokens(CallArgs::default().arg("a"), &["--factor", "5"]).unwrap(),
            "ax5"
        );
    }

    #[test]
    fn test_function_binder_reports_resolution_errors() {
        let sig = Signature::new("g").param("a");
        let binder = FunctionBinder::new(sig, |_| (), BinderOptions::new()).unwrap();
        let tokens: [&str; 0] = [];
        assert!(matches!(
            binder.call_tokens(CallArgs::default(), &tokens),
            Err(BindError::Resolution { .. })
        ));
    }

    #[test]
    fn test_contradictory_modes_fail_at_construction() {
        let sig = Signature::new("g");
        let options = BinderOptions::new().collect_extra(true).strict(true);
        assert!(matches!(
            FunctionBinder::new(sig, |_| (), options),
            Err(BindError::Configuration(_))
        ));
    }

    #[test]
    fn test_object_mutate_works_on_copy() {
        let binder = ObjectBinder::new(job(), "Job", BinderOptions::new()).unwrap();
        let updated = binder
            .mutate_tokens(CallArgs::default(), &["--retries=5", "--dry-run", "1", "--tags", "a,b"])
            .unwrap();

        assert_eq!(updated.retries, 5);
        assert!(updated.dry_run);
        assert_eq!(updated.tags.as_deref(), Some("a,b"));
        assert_eq!(binder.target(), &job());
    }

    #[test]
    fn test_object_positionals_fold_onto_fields() {
        let binder = ObjectBinder::new(job(), "Job", BinderOptions::new()).unwrap();
        let map = binder
            .to_map_tokens(CallArgs::default(), &["weekly", "9", "--name", "hourly"])
            .unwrap();
        assert_eq!(map["name"], json!("hourly"));
        assert_eq!(map["retries"], json!(9));
        assert_eq!(map.len(), 2);

        let err = binder
            .to_map_tokens(CallArgs::default(), &["a", "1", "0", "t", "extra"])
            .unwrap_err();
        assert!(matches!(err, BindError::Execution(_)));
    }

    #[test]
    fn test_object_method_is_protected() {
        let binder = ObjectBinder::new(job(), "Job", BinderOptions::new()).unwrap();
        let err = binder
            .mutate_tokens(CallArgs::default().kwarg("run", 1), &["--retries", "1"])
            .unwrap_err();
        assert!(matches!(err, BindError::Execution(ref msg) if msg.contains("method 'run'")));
    }

    #[test]
    fn test_object_unknown_extra_rejected_by_default() {
        let options = BinderOptions::new().collect_extra(true);
        let binder = ObjectBinder::new(job(), "Job", options).unwrap();
        let err = binder
            .mutate_tokens(CallArgs::default(), &["--owner", "ops"])
            .unwrap_err();
        assert!(matches!(err, BindError::Execution(ref msg) if msg.contains("no field named 'owner'")));
    }

    #[test]
    fn test_object_setter_type_error() {
        let binder = ObjectBinder::new(job(), "Job", BinderOptions::new()).unwrap();
        let err = binder
            .mutate_tokens(CallArgs::default().kwarg("retries", "many"), &[] as &[&str])
            .unwrap_err();
        assert!(matches!(err, BindError::Execution(_)));
    }

    #[test]
    fn test_mapping_binder() {
        let source = json!({"lr": 0.1, "epochs": 10, "_seed": 1, "name": null});
        let source = source.as_object().cloned().unwrap();
        let options = BinderOptions::new().collect_extra(true);
        let binder = MappingBinder::new(source.clone(), "config", options).unwrap();

        let tokens = ["--lr=0.01", "--name", "run1", "--momentum", "0.9"];
        let fresh = binder.mutate_tokens(CallArgs::default(), &tokens).unwrap();
        assert_eq!(fresh["lr"], json!(0.01));
        assert_eq!(fresh["epochs"], json!(10));
        assert_eq!(fresh["_seed"], json!(1));
        assert_eq!(fresh["name"], json!("run1"));
        assert_eq!(fresh["momentum"], json!("0.9"));
        assert_eq!(binder.source(), &source);

        let merged = binder.to_map_tokens(CallArgs::default(), &tokens).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(!merged.contains_key("epochs"));
    }

    #[test]
    fn test_extending_shared_parser() {
        let base = Command::new("tool").arg(clap::Arg::new("level").long("level"));
        let binder = MappingBinder::extending(
            base,
            json!({"epochs": 1}).as_object().cloned().unwrap(),
            "config",
            BinderOptions::new().strict(true),
        )
        .unwrap();

        let merged = binder
            .to_map_tokens(CallArgs::default(), &["--level", "high", "--epochs", "4"])
            .unwrap();
        assert_eq!(merged["epochs"], json!(4));
        assert!(!merged.contains_key("level"));
    }
}
