//! Conversions between Terraform values and plain Rust values.
//!
//! Expand helpers read a state attribute and never fail: null and unknown read as the
//! zero value. Flatten helpers write API values back into the state.
use tf_provider::value::Value;

pub type TfString = Value<String>;
pub type TfBool = Value<bool>;
pub type TfInt = Value<i64>;
pub type TfStrings = Value<Vec<Value<String>>>;
pub type TfBlocks<T> = Value<Vec<Value<T>>>;

pub fn string(value: &TfString) -> String {
    match value {
        Value::Value(value) => value.clone(),
        Value::Null | Value::Unknown => String::new(),
    }
}

/// The configured string, or `None` when it is null, unknown or empty.
pub fn opt_string(value: &TfString) -> Option<String> {
    match value {
        Value::Value(value) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

pub fn boolean(value: &TfBool) -> bool {
    matches!(value, Value::Value(true))
}

pub fn int(value: &TfInt) -> i64 {
    match value {
        Value::Value(value) => *value,
        Value::Null | Value::Unknown => 0,
    }
}

pub fn opt_int(value: &TfInt) -> Option<i64> {
    match value {
        Value::Value(value) => Some(*value),
        Value::Null | Value::Unknown => None,
    }
}

/// Known list items as strings. A null, unknown or empty list is `None`, never `Some(vec![])`.
pub fn slice_from_list(list: &TfStrings) -> Option<Vec<String>> {
    let Value::Value(items) = list else {
        return None;
    };
    let items: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::Value(item) => Some(item.clone()),
            Value::Null | Value::Unknown => None,
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

pub fn strings(list: &TfStrings) -> Vec<String> {
    slice_from_list(list).unwrap_or_default()
}

/// Known nested blocks, in configuration order.
pub fn blocks<T>(list: &TfBlocks<T>) -> Vec<&T> {
    match list {
        Value::Value(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Value(item) => Some(item),
                Value::Null | Value::Unknown => None,
            })
            .collect(),
        Value::Null | Value::Unknown => Vec::new(),
    }
}

pub fn list_from<S: AsRef<str>>(values: &[S]) -> TfStrings {
    Value::Value(
        values
            .iter()
            .map(|value| Value::Value(value.as_ref().to_string()))
            .collect(),
    )
}

pub fn blocks_from<T>(values: Vec<T>) -> TfBlocks<T> {
    Value::Value(values.into_iter().map(Value::Value).collect())
}

/// Values that Terraform treats as "not set" for optional attributes.
pub trait Zero {
    fn is_zero(&self) -> bool;
}

impl Zero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Zero for i64 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl<T> Zero for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

/// Set a computed or required attribute.
pub fn set<T>(target: &mut Value<T>, value: T) {
    *target = Value::Value(value);
}

/// Set a computed string attribute; a missing value reads as an empty string.
pub fn set_string(target: &mut TfString, value: Option<&str>) {
    set(target, value.unwrap_or_default().to_string());
}

/// Set an optional attribute. A zero value leaves a null attribute null, so an unset
/// attribute stays unset after apply.
pub fn set_optional<T: Zero>(target: &mut Value<T>, value: T) {
    if value.is_zero() && matches!(target, Value::Null) {
        return;
    }
    *target = Value::Value(value);
}

pub fn set_optional_string(target: &mut TfString, value: Option<&str>) {
    set_optional(target, value.unwrap_or_default().to_string());
}

pub fn set_optional_list<S: AsRef<str>>(target: &mut TfStrings, values: &[S]) {
    if values.is_empty() && matches!(target, Value::Null) {
        return;
    }
    *target = list_from(values);
}

/// Plan helper for optional+computed attributes: the server decides when unset.
pub fn unknown_if_null<T>(target: &mut Value<T>) {
    if matches!(target, Value::Null) {
        *target = Value::Unknown;
    }
}

pub fn default_if_null<T>(target: &mut Value<T>, default: T) {
    if matches!(target, Value::Null) {
        *target = Value::Value(default);
    }
}
