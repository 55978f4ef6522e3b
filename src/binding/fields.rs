//! Field registries for object and mapping targets
//!
//! A type opts into object binding by listing its fields in order, each with a
//! getter (reporting the current value, which becomes the default) and a
//! setter. The [`fields!`](crate::fields) macro derives the registry through
//! `serde_json` for plain structs.

use super::descriptor::{check_reserved, DefaultValue, ParameterDescriptor};
use super::error::BindResult;
use serde_json::{Map, Value};

/// One registered field of `T`
pub struct Field<T> {
    /// Field name
    pub name: &'static str,

    /// Read the current value
    pub get: fn(&T) -> Value,

    /// Write a new value; the error text explains why the value was rejected
    pub set: fn(&mut T, Value) -> Result<(), String>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            get: self.get,
            set: self.set,
        }
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Explicit registration contract for object binding
pub trait FieldRegistry: Clone {
    /// Ordered fields
    fn fields() -> Vec<Field<Self>>;

    /// Names that resolve to behavior rather than data; these can never be overwritten
    fn methods() -> &'static [&'static str] {
        &[]
    }

    /// Store a keyword that matches no registered field.
    ///
    /// Rejects it by default.
    fn set_extra(&mut self, name: &str, _value: Value) -> Result<(), String> {
        Err(format!("no field named '{}'", name))
    }
}

/// Whether an attribute name is internal (never exposed as an option)
pub fn is_internal(name: &str) -> bool {
    name.starts_with('_')
}

/// Descriptors for the public fields of `target`, defaulting to their current values
pub fn object_descriptors<T: FieldRegistry>(target: &T) -> BindResult<Vec<ParameterDescriptor>> {
    let descriptors: Vec<ParameterDescriptor> = T::fields()
        .into_iter()
        .filter(|f| !is_internal(f.name))
        .map(|f| ParameterDescriptor {
            name: f.name.to_string(),
            default: DefaultValue::Given((f.get)(target)),
            keyword_only: false,
        })
        .collect();

    check_reserved(descriptors.iter().map(|d| d.name.as_str()))?;
    Ok(descriptors)
}

/// Attribute-like view over a mapping: public keys become fields
pub fn mapping_descriptors(map: &Map<String, Value>) -> BindResult<Vec<ParameterDescriptor>> {
    let descriptors: Vec<ParameterDescriptor> = map
        .iter()
        .filter(|(k, _)| !is_internal(k))
        .map(|(k, v)| ParameterDescriptor {
            name: k.clone(),
            default: DefaultValue::Given(v.clone()),
            keyword_only: false,
        })
        .collect();

    check_reserved(descriptors.iter().map(|d| d.name.as_str()))?;
    Ok(descriptors)
}

/// Implement [`FieldRegistry`] for a struct whose listed fields are
/// `serde::Serialize + serde::de::DeserializeOwned`.
///
/// ```
/// use clify::fields;
///
/// #[derive(Clone)]
/// struct Settings {
///     x: i64,
///     y: String,
/// }
///
/// impl Settings {
///     fn reset(&mut self) {}
/// }
///
/// fields!(Settings { x, y } methods [reset]);
/// ```
#[macro_export]
macro_rules! fields {
    ($ty:ty { $($field:ident),* $(,)? } $(methods [$($method:ident),* $(,)?])?) => {
        impl $crate::binding::FieldRegistry for $ty {
            fn fields() -> ::std::vec::Vec<$crate::binding::Field<Self>> {
                ::std::vec![$(
                    $crate::binding::Field {
                        name: ::std::stringify!($field),
                        get: |this: &Self| {
                            $crate::__private::serde_json::to_value(&this.$field)
                                .unwrap_or($crate::__private::serde_json::Value::Null)
                        },
                        set: |this: &mut Self, value| {
                            this.$field = $crate::__private::serde_json::from_value(value)
                                .map_err(|e| e.to_string())?;
                            Ok(())
                        },
                    }
                ),*]
            }

            $(
                fn methods() -> &'static [&'static str] {
                    &[$(::std::stringify!($method)),*]
                }
            )?
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::descriptor::POSITIONAL_SLOT;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: i64,
        y: String,
        _cache: Option<String>,
    }

    crate::fields!(Point { x, y, _cache } methods [norm]);

    #[test]
    fn test_object_descriptors_skip_internal() {
        let point = Point {
            x: 0,
            y: "temp".to_string(),
            _cache: None,
        };
        let descriptors = object_descriptors(&point).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "x");
        assert_eq!(descriptors[0].default.value(), Some(&json!(0)));
        assert_eq!(descriptors[1].default.value(), Some(&json!("temp")));
    }

    #[test]
    fn test_macro_setter_round_trip() {
        let mut point = Point {
            x: 0,
            y: String::new(),
            _cache: None,
        };
        let fields = Point::fields();
        (fields[0].set)(&mut point, json!(7)).unwrap();
        assert_eq!(point.x, 7);
        assert!((fields[0].set)(&mut point, json!("seven")).is_err());
        assert_eq!(Point::methods(), &["norm"]);
    }

    #[test]
    fn test_mapping_descriptors() {
        let map = json!({"a": 1, "_hidden": 2, "b": null});
        let descriptors = mapping_descriptors(map.as_object().unwrap()).unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_mapping_reserved_key_is_internal() {
        let mut map = Map::new();
        map.insert(POSITIONAL_SLOT.to_string(), json!(1));
        map.insert("ok".to_string(), json!(1));

        let descriptors = mapping_descriptors(&map).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "ok");
    }
}
