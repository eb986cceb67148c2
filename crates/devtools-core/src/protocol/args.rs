//! Argument maps for outgoing commands.
//!
//! The DevTools back-end distinguishes a parameter that was *not supplied*
//! from one supplied as `null`.  An omitted optional parameter must therefore
//! never appear in the `params` object at all.  [`CallArgs`] enforces this by
//! construction: absent values are never stored, so there is nothing to strip
//! at send time.
//!
//! [`Param`] is the tri-state used when a caller needs to say "send null"
//! explicitly; generated bindings use plain `Option<T>` (absent or value).

use serde_json::{Map, Value};

/// A parameter value that may be unset, explicitly null, or present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Param<T> {
    /// Not supplied; omitted from the wire.
    #[default]
    Absent,
    /// Supplied as JSON `null`.
    Null,
    /// Supplied with a value.
    Value(T),
}

impl<T> Param<T> {
    /// `true` for [`Param::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> From<Option<T>> for Param<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Absent,
        }
    }
}

/// The `params` object of one command, built with a fluent API.
///
/// # Examples
///
/// ```rust
/// use devtools_core::protocol::CallArgs;
///
/// let args = CallArgs::new()
///     .arg("url", "http://example.com")
///     .opt_arg("referrer", None::<&str>);
///
/// assert_eq!(args.len(), 1);
/// assert!(args.get("referrer").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    params: Map<String, Value>,
}

impl CallArgs {
    /// An empty argument map; serialises as `{}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required argument.
    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Adds an optional argument; `None` is left out entirely.
    pub fn opt_arg<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        self.param(name, Param::from(value))
    }

    /// Adds a tri-state argument: absent is omitted, null is sent as `null`.
    pub fn param<V: Into<Value>>(mut self, name: &str, value: Param<V>) -> Self {
        match value {
            Param::Absent => {}
            Param::Null => {
                self.params.insert(name.to_string(), Value::Null);
            }
            Param::Value(v) => {
                self.params.insert(name.to_string(), v.into());
            }
        }
        self
    }

    /// Wraps an existing JSON object.  Returns `None` for any other JSON
    /// value, since `params` must be an object on the wire.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(params) => Some(Self { params }),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Consumes the builder and returns the `params` object.
    pub fn into_value(self) -> Value {
        Value::Object(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_args_serialise_as_empty_object() {
        assert_eq!(CallArgs::new().into_value(), json!({}));
    }

    #[test]
    fn test_required_args_are_all_sent() {
        // Arrange / Act
        let args = CallArgs::new()
            .arg("url", "http://example.com")
            .arg("depth", 3)
            .arg("pierce", true);

        // Assert
        assert_eq!(
            args.into_value(),
            json!({"url": "http://example.com", "depth": 3, "pierce": true})
        );
    }

    #[test]
    fn test_absent_optional_is_omitted() {
        let args = CallArgs::new()
            .arg("url", "http://example.com")
            .opt_arg("referrer", None::<&str>);

        let value = args.into_value();

        assert!(value.get("referrer").is_none(), "absent key must not be sent");
    }

    #[test]
    fn test_present_optional_is_sent() {
        let args = CallArgs::new().opt_arg("quality", Some(80));
        assert_eq!(args.get("quality"), Some(&json!(80)));
    }

    #[test]
    fn test_explicit_null_is_sent_as_null() {
        // Arrange / Act
        let args = CallArgs::new()
            .param("frameId", Param::<&str>::Null)
            .param("referrer", Param::<&str>::Absent);

        // Assert: null is present, absent is not
        assert_eq!(args.get("frameId"), Some(&Value::Null));
        assert!(args.get("referrer").is_none());
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_param_from_option() {
        assert!(Param::<i64>::from(None).is_absent());
        assert_eq!(Param::from(Some(5)), Param::Value(5));
        assert!(Param::<i64>::default().is_absent());
    }

    #[test]
    fn test_from_json_accepts_objects_and_null_only() {
        assert_eq!(CallArgs::from_json(json!({"a": 1})).map(|a| a.len()), Some(1));
        assert!(CallArgs::from_json(Value::Null).is_some_and(|a| a.is_empty()));
        assert!(CallArgs::from_json(json!([1, 2])).is_none());
    }
}
