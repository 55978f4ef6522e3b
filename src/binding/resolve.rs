//! Resolving call arguments against a declared signature
//!
//! 1. Positionals fill positional-or-keyword parameters in order; surplus goes to `*args`
//! 2. Keywords fill parameters by name; unknown names go to `**kwargs`
//! 3. Unfilled parameters take their defaults
//! 4. Anything left unfilled, surplus without a collector, or a parameter
//!    filled twice is an error

use super::descriptor::{DefaultValue, Signature};
use super::error::{BindError, BindResult};
use super::merge::CallArgs;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Arguments assigned to the parameters of a [`Signature`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Map<String, Value>,
    var_args: Vec<Value>,
    var_kwargs: Map<String, Value>,
    var_args_name: Option<String>,
    var_kwargs_name: Option<String>,
}

impl BoundArguments {
    /// Value bound to a named parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserialize the value bound to a named parameter
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> BindResult<T> {
        let value = self
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| BindError::execution(format!("no parameter named '{}'", name)))?;
        serde_json::from_value(value).map_err(|e| {
            BindError::execution(format!("parameter '{}' has an unexpected type: {}", name, e))
        })
    }

    /// Surplus positionals collected by `*args`
    pub fn var_args(&self) -> &[Value] {
        &self.var_args
    }

    /// Unknown keywords collected by `**kwargs`
    pub fn var_kwargs(&self) -> &Map<String, Value> {
        &self.var_kwargs
    }

    /// Every parameter by name, collectors included as an array and an object
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.values;
        if let Some(name) = self.var_args_name {
            map.insert(name, Value::Array(self.var_args));
        }
        if let Some(name) = self.var_kwargs_name {
            map.insert(name, Value::Object(self.var_kwargs));
        }
        map
    }
}

impl Signature {
    /// Assign `call` to this signature's parameters
    pub fn resolve(&self, call: &CallArgs) -> BindResult<BoundArguments> {
        let mut bound = BoundArguments {
            var_args_name: self.var_positional_name().map(str::to_string),
            var_kwargs_name: self.var_keyword_name().map(str::to_string),
            ..BoundArguments::default()
        };

        let positional: Vec<_> = self.params().filter(|p| !p.keyword_only).collect();

        for (i, value) in call.args.iter().enumerate() {
            match positional.get(i) {
                Some(param) => {
                    bound.values.insert(param.name.clone(), value.clone());
                }
                None if bound.var_args_name.is_some() => bound.var_args.push(value.clone()),
                None => {
                    return Err(BindError::resolution(
                        self.name(),
                        format!(
                            "takes {} positional arguments but {} were given",
                            positional.len(),
                            call.args.len()
                        ),
                    ));
                }
            }
        }

        for (name, value) in &call.kwargs {
            if self.params().any(|p| &p.name == name) {
                if bound.values.contains_key(name) {
                    return Err(BindError::resolution(
                        self.name(),
                        format!("got multiple values for argument '{}'", name),
                    ));
                }
                bound.values.insert(name.clone(), value.clone());
            } else if bound.var_kwargs_name.is_some() {
                bound.var_kwargs.insert(name.clone(), value.clone());
            } else {
                return Err(BindError::resolution(
                    self.name(),
                    format!("got an unexpected keyword argument '{}'", name),
                ));
            }
        }

        for param in self.params() {
            if bound.values.contains_key(&param.name) {
                continue;
            }
            match &param.default {
                DefaultValue::Given(default) => {
                    bound.values.insert(param.name.clone(), default.clone());
                }
                DefaultValue::Empty => {
                    let kind = if param.keyword_only {
                        "keyword-only"
                    } else {
                        "positional"
                    };
                    return Err(BindError::resolution(
                        self.name(),
                        format!("missing required {} argument: '{}'", kind, param.name),
                    ));
                }
            }
        }

        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn f() -> Signature {
        Signature::new("f")
            .param("a")
            .param_default("x", 20)
            .var_positional("p")
            .keyword_only("w", "1")
            .var_keyword("kwargs")
    }

    #[test]
    fn test_positional_then_var_args() {
        let call = CallArgs::default().arg("a").arg(1).arg("p1").arg("p2");
        let bound = f().resolve(&call).unwrap();
        assert_eq!(bound.get("a"), Some(&json!("a")));
        assert_eq!(bound.get_as::<i64>("x").unwrap(), 1);
        assert_eq!(bound.var_args(), &[json!("p1"), json!("p2")]);
        assert_eq!(bound.get("w"), Some(&json!("1")));
    }

    #[test]
    fn test_unknown_keywords_collected() {
        let call = CallArgs::default().arg("a").kwarg("k", "v");
        let map = f().resolve(&call).unwrap().into_map();
        assert_eq!(map["kwargs"], json!({"k": "v"}));
        assert_eq!(map["p"], json!([]));
    }

    #[test]
    fn test_too_many_positional() {
        let sig = Signature::new("g").param("a");
        let err = sig.resolve(&CallArgs::default().arg(1).arg(2)).unwrap_err();
        assert_eq!(err.to_string(), "g() takes 1 positional arguments but 2 were given");
    }

    #[test]
    fn test_multiple_values() {
        let call = CallArgs::default().arg("a").kwarg("a", "again");
        let err = f().resolve(&call).unwrap_err();
        assert!(err.to_string().contains("multiple values for argument 'a'"));
    }

    #[test]
    fn test_unexpected_keyword() {
        let sig = Signature::new("g").param_default("a", 1);
        let err = sig.resolve(&CallArgs::default().kwarg("b", 2)).unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'b'"));
    }

    #[test]
    fn test_missing_required() {
        let err = f().resolve(&CallArgs::default()).unwrap_err();
        assert!(err.to_string().contains("missing required positional argument: 'a'"));

        let sig = Signature::new("g").keyword_only_required("w");
        let err = sig.resolve(&CallArgs::default()).unwrap_err();
        assert!(err.to_string().contains("keyword-only argument: 'w'"));
    }

    #[test]
    fn test_get_as_type_mismatch() {
        let bound = f().resolve(&CallArgs::default().arg("a")).unwrap();
        assert!(bound.get_as::<i64>("w").is_err());
        assert!(bound.get_as::<i64>("missing").is_err());
    }
}
