//! Parameter descriptors and explicitly declared callable signatures

use super::coerce::Coercion;
use super::error::{BindError, BindResult};
use serde_json::Value;

/// Internal name of the slot capturing free positional command-line tokens.
///
/// No parameter or field may use it.
pub const POSITIONAL_SLOT: &str = "__positional";

/// Default of a bindable parameter
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// The parameter has no default
    Empty,
    /// The parameter defaults to this value
    Given(Value),
}

impl DefaultValue {
    /// The default value, if there is one
    pub fn value(&self) -> Option<&Value> {
        match self {
            DefaultValue::Empty => None,
            DefaultValue::Given(v) => Some(v),
        }
    }

    /// Whether the parameter has no default
    pub fn is_empty(&self) -> bool {
        matches!(self, DefaultValue::Empty)
    }
}

/// One bindable parameter or attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name (used in code)
    pub name: String,

    /// Default value
    pub default: DefaultValue,

    /// Whether the parameter can only be passed by keyword
    pub keyword_only: bool,
}

impl ParameterDescriptor {
    /// Parameter without a default
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: DefaultValue::Empty,
            keyword_only: false,
        }
    }

    /// Parameter with a default
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: DefaultValue::Given(default.into()),
            keyword_only: false,
        }
    }

    /// Mark as keyword-only
    pub fn keyword_only(mut self) -> Self {
        self.keyword_only = true;
        self
    }

    /// Coercion for values supplied through this parameter's option
    pub fn coercion(&self) -> Coercion {
        Coercion::infer(self.default.value())
    }

    /// Coercion for a free positional token governed by this parameter
    pub fn positional_coercion(&self) -> Coercion {
        if self.keyword_only {
            Coercion::Raw
        } else {
            self.coercion()
        }
    }
}

/// Reject descriptor names that collide with [`POSITIONAL_SLOT`]
pub fn check_reserved<'a, I>(names: I) -> BindResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        if name == POSITIONAL_SLOT {
            return Err(BindError::config(format!(
                "'{}' is reserved for positional command-line arguments and cannot name a parameter",
                POSITIONAL_SLOT
            )));
        }
    }
    Ok(())
}

/// Explicitly declared signature of a callable target.
///
/// Parameters are declared in order. Positional-or-keyword parameters come
/// first, keyword-only parameters after them, matching how they appear in
/// the descriptor list.
///
/// ```
/// use clify::binding::Signature;
///
/// let sig = Signature::new("f")
///     .param("a")
///     .param_default("x", 20)
///     .var_positional("p")
///     .keyword_only("w", "1")
///     .var_keyword("kwargs");
///
/// assert_eq!(sig.positional_count(), 2);
/// assert_eq!(sig.descriptors().unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    positional: Vec<ParameterDescriptor>,
    keyword_only: Vec<ParameterDescriptor>,
    var_positional: Option<String>,
    var_keyword: Option<String>,
}

impl Signature {
    /// Start a signature for the named callable
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            keyword_only: Vec::new(),
            var_positional: None,
            var_keyword: None,
        }
    }

    /// Positional-or-keyword parameter without a default
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.positional.push(ParameterDescriptor::required(name));
        self
    }

    /// Positional-or-keyword parameter with a default
    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.positional
            .push(ParameterDescriptor::with_default(name, default));
        self
    }

    /// Collector for surplus positional arguments (`*args`)
    pub fn var_positional(mut self, name: impl Into<String>) -> Self {
        self.var_positional = Some(name.into());
        self
    }

    /// Keyword-only parameter with a default
    pub fn keyword_only(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.keyword_only
            .push(ParameterDescriptor::with_default(name, default).keyword_only());
        self
    }

    /// Keyword-only parameter without a default
    pub fn keyword_only_required(mut self, name: impl Into<String>) -> Self {
        self.keyword_only
            .push(ParameterDescriptor::required(name).keyword_only());
        self
    }

    /// Collector for unknown keyword arguments (`**kwargs`)
    pub fn var_keyword(mut self, name: impl Into<String>) -> Self {
        self.var_keyword = Some(name.into());
        self
    }

    /// Callable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters that accept positional arguments
    pub fn positional_count(&self) -> usize {
        self.positional.len()
    }

    /// Name of the `*args` collector, if declared
    pub fn var_positional_name(&self) -> Option<&str> {
        self.var_positional.as_deref()
    }

    /// Name of the `**kwargs` collector, if declared
    pub fn var_keyword_name(&self) -> Option<&str> {
        self.var_keyword.as_deref()
    }

    /// All named parameters in declaration order, without checking reserved names
    pub fn params(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.positional.iter().chain(self.keyword_only.iter())
    }

    /// Bindable descriptors: positional-or-keyword then keyword-only.
    ///
    /// Variadic collectors are not descriptors. Fails if any name collides
    /// with [`POSITIONAL_SLOT`].
    pub fn descriptors(&self) -> BindResult<Vec<ParameterDescriptor>> {
        check_reserved(
            self.params()
                .map(|p| p.name.as_str())
                .chain(self.var_positional.as_deref())
                .chain(self.var_keyword.as_deref()),
        )?;
        Ok(self.params().cloned().collect())
    }
}
