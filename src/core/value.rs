//! Nested value model
//!
//! [`Value`] is the tagged variant every helper in this crate works on. The
//! text/container classification is an explicit capability check on the
//! variant, never a trial operation: only [`Value::Text`] is text, and only lists,
//! tuples and shared handles resolving to one of them are containers.

use crate::error::FlattenError;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A possibly nested value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Key/value object, always treated as an opaque leaf
    Object(serde_json::Map<String, serde_json::Value>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Reference-counted handle; the only way to alias or build cycles
    Shared(SharedValue),
}

/// The kind of ordered container a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Tuple,
}

impl ContainerKind {
    /// Build a container of this kind holding `items`
    pub fn build(self, items: Vec<Value>) -> Value {
        match self {
            ContainerKind::List => Value::List(items),
            ContainerKind::Tuple => Value::Tuple(items),
        }
    }
}

impl Value {
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Wrap this value in a new shared handle
    pub fn shared(self) -> Self {
        Value::Shared(SharedValue::new(self))
    }

    /// String-like check
    pub fn is_text(&self) -> bool {
        match self {
            Value::Text(_) => true,
            Value::Shared(shared) => shared.resolve_with(Value::is_text).unwrap_or(false),
            _ => false,
        }
    }

    /// Iterability check
    pub fn is_container(&self) -> bool {
        self.container_kind().is_some()
    }

    /// True for every value flattening treats as a leaf
    pub fn is_atomic(&self) -> bool {
        !self.is_container()
    }

    /// True for a list (not a tuple) whose elements are all integers
    pub fn is_int_list(&self) -> bool {
        match self {
            Value::List(items) => items.iter().all(|item| matches!(item, Value::Int(_))),
            Value::Shared(shared) => shared.resolve_with(Value::is_int_list).unwrap_or(false),
            _ => false,
        }
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Value::List(_) => Some(ContainerKind::List),
            Value::Tuple(_) => Some(ContainerKind::Tuple),
            Value::Shared(shared) => shared.resolve_with(Value::container_kind).flatten(),
            _ => None,
        }
    }

    /// Direct elements of an owned list or tuple
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Shared(_) => "shared",
        }
    }

    /// String coercion: text comes back as-is, anything else is rendered.
    pub fn make_str(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Convert to JSON. Tuples become arrays and shared handles are resolved.
    pub fn to_json(&self) -> Result<serde_json::Value, FlattenError> {
        let mut visiting = HashSet::new();
        self.to_json_inner(&mut visiting, 0)
    }

    fn to_json_inner(
        &self,
        visiting: &mut HashSet<usize>,
        depth: usize,
    ) -> Result<serde_json::Value, FlattenError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Int(number) => serde_json::Value::from(*number),
            Value::Float(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Object(map) => serde_json::Value::Object(map.clone()),
            Value::List(items) | Value::Tuple(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json_inner(visiting, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Shared(shared) => {
                let id = shared.identity();
                if !visiting.insert(id) {
                    return Err(FlattenError::Cyclic { depth });
                }
                let json = shared.get().to_json_inner(visiting, depth);
                visiting.remove(&id);
                json?
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{}", text),
            other => match other.to_json() {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "<cyclic>"),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(int) => Value::Int(int),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::Text(text),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(map),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Int(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Int(i64::from(number))
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Float(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<SharedValue> for Value {
    fn from(shared: SharedValue) -> Self {
        Value::Shared(shared)
    }
}

/// Shared, mutable handle to a [`Value`].
///
/// Equality is identity: two handles are equal when they point at the same
/// allocation.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Address of the shared allocation
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Snapshot of the current contents
    pub fn get(&self) -> Value {
        self.with(Value::clone)
    }

    pub fn set(&self, value: Value) {
        self.update(|slot| *slot = value);
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Identities along the chain of handles starting at this one, up to the
    /// first non-shared value or the first repeated handle.
    pub fn alias_chain(&self) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.clone();
        loop {
            let id = current.identity();
            if chain.contains(&id) {
                return chain;
            }
            chain.push(id);
            match current.with(|value| match value {
                Value::Shared(inner) => Some(inner.clone()),
                _ => None,
            }) {
                Some(inner) => current = inner,
                None => return chain,
            }
        }
    }

    /// Follow handles until a non-shared value and apply `f` to it.
    /// Returns `None` when the handles loop back without reaching one.
    pub fn resolve_with<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut seen = HashSet::new();
        let mut current = self.clone();
        loop {
            if !seen.insert(current.identity()) {
                return None;
            }
            let next = current.with(|value| match value {
                Value::Shared(inner) => Err(inner.clone()),
                other => Ok(f.take().map(|f| f(other))),
            });
            match next {
                Ok(result) => return result,
                Err(inner) => current = inner,
            }
        }
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.identity())
    }
}
