//! Resolving a typed promise from payloads whose type is only known at run
//! time. A payload of the wrong type rejects the promise with
//! [`Error::TypeMismatch`] instead of fulfilling it.
use std::any::{self, Any};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Promise};

impl<T> Promise<T>
where
    T: Any,
{
    /// Resolves with `value` if it is a `T`; rejects otherwise.
    ///
    /// ```
    /// use promise_out::Promise;
    ///
    /// let name = Promise::<String>::new();
    /// name.resolve_any(5_i32);
    /// assert!(name.error().unwrap().is_type_mismatch());
    /// ```
    pub fn resolve_any<V>(&self, value: V) -> bool
    where
        V: Any,
    {
        let boxed: Box<dyn Any> = Box::new(value);
        match boxed.downcast::<T>() {
            Ok(value) => self.resolve(*value),
            Err(_) => self.reject_mismatch(format!("a value of type `{}`", any::type_name::<V>())),
        }
    }

    /// Like [`resolve_any`](Self::resolve_any) for an already type-erased
    /// payload.
    pub fn resolve_boxed(&self, payload: Box<dyn Any + Send>) -> bool {
        match payload.downcast::<T>() {
            Ok(value) => self.resolve(*value),
            Err(_) => self.reject_mismatch("a type-erased value of another type".to_string()),
        }
    }

    fn reject_mismatch(&self, found: String) -> bool {
        if self.is_settled() {
            return false;
        }
        let err = Error::TypeMismatch {
            expected: any::type_name::<T>(),
            found,
        };
        tracing::warn!(%err, "rejecting mistyped resolution");
        self.reject(err)
    }
}

impl<T> Promise<T>
where
    T: DeserializeOwned + Any,
{
    /// Resolves with `payload` decoded as a `T`; rejects if it does not
    /// decode.
    pub fn resolve_json(&self, payload: Value) -> bool {
        if self.is_settled() {
            return false;
        }
        let kind = json_kind(&payload);
        match serde_json::from_value::<T>(payload) {
            Ok(value) => self.resolve(value),
            Err(err) => self.reject_mismatch(format!("a JSON {kind} ({err})")),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
