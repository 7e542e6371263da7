//! Combinators for turning untrusted, loosely typed input into typed values.
//!
//! The outcome type is the standard [`Result`]: `Ok` is the success variant and `Err` the
//! failure variant, with [`Result::map`] and [`Result::and_then`] for sequencing. What this
//! module adds are the combinators that *aggregate* failures instead of short-circuiting:
//!
//! - [`shape`] / [`shape!`](crate::shape) evaluate every field and report every failing one,
//! - [`one_of`] returns the first success, in order, or every failure,
//! - [`combine`] succeeds only if every element does, otherwise returns all failures,
//! - [`group_by_type`] partitions a list without discarding either side,
//! - [`record`] / [`record_strict`] validate the values (and keys) of a JSON object.
//!
//! No parser in this module panics; every outcome is representable as a value.
use serde_json::Value;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

mod primitives;
pub use primitives::*;

/// A structural mismatch between untrusted input and the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value has the wrong JSON kind
    #[error("expected {expected}, found {found}")]
    WrongType { expected: &'static str, found: &'static str },
    /// A required object key is absent
    #[error("missing field `{0}`")]
    MissingField(String),
    /// The value has the right kind but an unacceptable content
    #[error("expected {expected}, found `{found}`")]
    Mismatch { expected: String, found: String },
    /// One or more fields of an object failed, keyed by field name
    #[error("invalid fields: {}", join_keys(.0))]
    Shape(BTreeMap<String, ValidationError>),
    /// One or more object keys failed to parse, keyed by the raw key
    #[error("invalid keys: {}", join_keys(.0))]
    Keys(BTreeMap<String, ValidationError>),
    /// One or more array elements failed, keyed by index
    #[error("invalid elements at {}", join_indices(.0))]
    Elements(Vec<(usize, ValidationError)>),
    /// None of several alternative parsers accepted the input
    #[error("none of {} alternatives matched", .0.len())]
    NoneSucceeded(Vec<ValidationError>),
}

fn join_keys(map: &BTreeMap<String, ValidationError>) -> String {
    map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn join_indices(elements: &[(usize, ValidationError)]) -> String {
    elements.iter().map(|(idx, _)| idx.to_string()).collect::<Vec<_>>().join(", ")
}

impl ValidationError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl fmt::Display) -> Self {
        Self::Mismatch { expected: expected.into(), found: found.to_string() }
    }

    /// Returns the failing field names if this is a [`ValidationError::Shape`] failure
    pub fn shape_keys(&self) -> Vec<&str> {
        match self {
            Self::Shape(fields) => fields.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Failure of [`one_of`]: every alternative failed, in the order they were tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoneSucceeded<E> {
    pub errors: Vec<E>,
}

impl<E> fmt::Display for NoneSucceeded<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "none of {} alternatives matched", self.errors.len())
    }
}

impl<E: fmt::Debug> std::error::Error for NoneSucceeded<E> {}

impl<E: Into<ValidationError>> From<NoneSucceeded<E>> for ValidationError {
    fn from(err: NoneSucceeded<E>) -> Self {
        Self::NoneSucceeded(err.errors.into_iter().map(Into::into).collect())
    }
}

/// Evaluates every keyed result independently.
///
/// Succeeds with every success value if no field failed, otherwise fails with *all* the
/// per-field failures. An empty input always succeeds.
pub fn shape<K, T, E, I>(fields: I) -> Result<BTreeMap<K, T>, BTreeMap<K, E>>
where
    K: Ord,
    I: IntoIterator<Item = (K, Result<T, E>)>,
{
    let mut values = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for (key, result) in fields {
        match result {
            Ok(value) => {
                values.insert(key, value);
            }
            Err(err) => {
                errors.insert(key, err);
            }
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

/// Heterogeneous [`shape`]: evaluates each `name: parser` pair, and returns either a tuple of
/// every success value (in declaration order) or a [`ValidationError::Shape`] holding every
/// failing field. Field failures must convert into [`ValidationError`].
///
/// Failures are keyed by the binding name, so name each binding after the key it reads. Raw
/// identifiers such as `r#type` are keyed without the `r#` prefix.
///
/// ```rust
/// use custodian_core::{shape, validation::{field, object, string, boolean}};
/// use serde_json::json;
///
/// let input = json!({ "name": "cow", "active": true });
/// let obj = object(&input).unwrap();
/// let (name, active) = shape! {
///     name: field(obj, "name").and_then(string),
///     active: field(obj, "active").and_then(boolean),
/// }
/// .unwrap();
/// assert_eq!((name, active), ("cow", true));
/// ```
#[macro_export]
macro_rules! shape {
    ($($name:ident : $parser:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut errors = ::std::collections::BTreeMap::<
            ::std::string::String,
            $crate::validation::ValidationError,
        >::new();
        $(
            let $name = match $parser {
                ::std::result::Result::Ok(value) => ::std::option::Option::Some(value),
                ::std::result::Result::Err(err) => {
                    errors.insert(
                        // `r#type` is reported as `type`
                        ::std::string::String::from(stringify!($name).trim_start_matches("r#")),
                        ::std::convert::Into::<$crate::validation::ValidationError>::into(err),
                    );
                    ::std::option::Option::None
                }
            };
        )*
        #[allow(unreachable_patterns)]
        let result: ::std::result::Result<_, $crate::validation::ValidationError> =
            match ($($name,)*) {
                ($(::std::option::Option::Some($name),)*) => ::std::result::Result::Ok(($($name,)*)),
                _ => ::std::result::Result::Err($crate::validation::ValidationError::Shape(errors)),
            };
        result
    }};
}

/// Returns the first success in iteration order.
///
/// Order is part of the contract: when several alternatives would accept the same input the
/// earliest one wins. Alternatives after the first success are not consumed. If none
/// succeeds, every failure is returned in order.
pub fn one_of<T, E, I>(results: I) -> Result<T, NoneSucceeded<E>>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => return Ok(value),
            Err(err) => errors.push(err),
        }
    }
    Err(NoneSucceeded { errors })
}

/// Succeeds with every value if every element succeeded, otherwise fails with every failure
/// in original order.
pub fn combine<T, E, I>(results: I) -> Result<Vec<T>, Vec<E>>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let (errors, values) = group_by_type(results);
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

/// Partitions results into `(failures, successes)`, both in original order.
pub fn group_by_type<T, E, I>(results: I) -> (Vec<E>, Vec<T>)
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut errors = Vec::new();
    let mut values = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(err) => errors.push(err),
        }
    }
    (errors, values)
}

/// Parses every element of a JSON array, reporting each failing index.
pub fn array_of<'a, T, E, F>(input: &'a Value, mut parser: F) -> Result<Vec<T>, ValidationError>
where
    F: FnMut(&'a Value) -> Result<T, E>,
    E: Into<ValidationError>,
{
    let items = array(input)?;
    combine(items.iter().enumerate().map(|(idx, item)| {
        parser(item).map_err(|err| (idx, Into::<ValidationError>::into(err)))
    }))
    .map_err(ValidationError::Elements)
}

/// Parses every value of a JSON object, keeping its keys.
pub fn record<'a, T, E, F>(
    input: &'a Value,
    mut parser: F,
) -> Result<BTreeMap<String, T>, ValidationError>
where
    F: FnMut(&'a Value) -> Result<T, E>,
    E: Into<ValidationError>,
{
    let obj = object(input)?;
    shape(obj.iter().map(|(key, value)| {
        (key.clone(), parser(value).map_err(Into::<ValidationError>::into))
    }))
        .map_err(ValidationError::Shape)
}

/// Like [`record`], but also parses and remaps every key.
///
/// Any invalid key fails the whole operation with [`ValidationError::Keys`] before values are
/// looked at. Two raw keys that remap to the same key are reported as invalid too.
pub fn record_strict<'a, K, V, KE, VE, KP, VP>(
    input: &'a Value,
    mut key_parser: KP,
    mut value_parser: VP,
) -> Result<BTreeMap<K, V>, ValidationError>
where
    K: Ord,
    KP: FnMut(&'a str) -> Result<K, KE>,
    VP: FnMut(&'a Value) -> Result<V, VE>,
    KE: Into<ValidationError>,
    VE: Into<ValidationError>,
{
    let obj = object(input)?;

    let mut keys = BTreeMap::new();
    let mut key_errors = BTreeMap::new();
    for (raw, value) in obj {
        match key_parser(raw) {
            Ok(key) if keys.contains_key(&key) => {
                key_errors.insert(raw.clone(), ValidationError::mismatch("unique key", raw));
            }
            Ok(key) => {
                keys.insert(key, (raw, value));
            }
            Err(err) => {
                key_errors.insert(raw.clone(), err.into());
            }
        }
    }
    if !key_errors.is_empty() {
        return Err(ValidationError::Keys(key_errors))
    }

    let mut values = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for (key, (raw, value)) in keys {
        match value_parser(value) {
            Ok(value) => {
                values.insert(key, value);
            }
            Err(err) => {
                errors.insert(raw.clone(), err.into());
            }
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(ValidationError::Shape(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fail(reason: &str) -> Result<u32, String> {
        Err(reason.to_string())
    }

    #[test]
    fn empty_shape_succeeds() {
        let fields: Vec<(&str, Result<u32, String>)> = vec![];
        assert_eq!(shape(fields), Ok(BTreeMap::new()));
        let res: Result<(), ValidationError> = shape! {};
        assert_eq!(res, Ok(()));
    }

    #[test]
    fn shape_reports_every_failing_field() {
        let res = shape(vec![("1", fail("a")), ("2", Ok(2)), ("3", fail("c"))]);
        let errors = res.unwrap_err();
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(errors["1"], "a");
        assert_eq!(errors["3"], "c");
    }

    #[test]
    fn shape_macro_collects_all_failures() {
        let input = json!({ "second": "ok" });
        let obj = object(&input).unwrap();
        let res = shape! {
            first: field(obj, "first").and_then(string),
            second: field(obj, "second").and_then(string),
            third: field(obj, "third").and_then(integer),
        };
        let err = res.unwrap_err();
        assert_eq!(err.shape_keys(), vec!["first", "third"]);
    }

    #[test]
    fn shape_macro_keys_raw_identifiers_by_their_name() {
        let input = json!({ "type": 1 });
        let obj = object(&input).unwrap();
        let err = shape! {
            r#type: field(obj, "type").and_then(string),
        }
        .unwrap_err();
        assert_eq!(err.shape_keys(), vec!["type"]);
    }

    #[test]
    fn shape_macro_returns_values_in_declaration_order() {
        let input = json!({ "a": 1, "b": "two", "c": true });
        let obj = object(&input).unwrap();
        let (a, b, c) = shape! {
            a: field(obj, "a").and_then(integer),
            b: field(obj, "b").and_then(string),
            c: field(obj, "c").and_then(boolean),
        }
        .unwrap();
        assert_eq!((a, b, c), (1, "two", true));
    }

    #[test]
    fn one_of_returns_first_success() {
        let res = one_of(vec![fail("a"), Ok(1), Ok(2), fail("b")]);
        assert_eq!(res, Ok(1));
    }

    #[test]
    fn one_of_does_not_evaluate_past_first_success() {
        let mut evaluated = 0;
        let res = one_of((0..5).map(|i| {
            evaluated += 1;
            if i == 1 {
                Ok(i)
            } else {
                Err(i)
            }
        }));
        assert_eq!(res, Ok(1));
        assert_eq!(evaluated, 2);
    }

    #[test]
    fn one_of_without_success_keeps_every_failure() {
        let res = one_of(vec![fail("a"), fail("b"), fail("c")]);
        let err = res.unwrap_err();
        assert_eq!(err.errors, vec!["a", "b", "c"]);

        let empty: Vec<Result<u32, String>> = vec![];
        assert_eq!(one_of(empty).unwrap_err().errors.len(), 0);
    }

    #[test]
    fn combine_aggregates_failures_in_order() {
        assert_eq!(combine(vec![Ok::<_, String>(1), Ok(2)]), Ok(vec![1, 2]));
        let res = combine(vec![fail("a"), Ok(2), fail("c")]);
        assert_eq!(res, Err(vec!["a".to_string(), "c".to_string()]));
    }

    #[test]
    fn group_by_type_keeps_both_sides() {
        let (errors, values) = group_by_type(vec![Ok(1), fail("a"), Ok(3)]);
        assert_eq!(errors, vec!["a"]);
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn array_of_reports_indices() {
        let input = json!([1, "x", 3, null]);
        let err = array_of(&input, integer).unwrap_err();
        match err {
            ValidationError::Elements(elements) => {
                assert_eq!(elements.iter().map(|(idx, _)| *idx).collect::<Vec<_>>(), vec![1, 3])
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(array_of(&json!([1, 2]), integer).unwrap(), vec![1, 2]);
        assert!(matches!(array(&json!({})), Err(ValidationError::WrongType { .. })));
    }

    #[test]
    fn record_parses_values() {
        let input = json!({ "a": 1, "b": 2 });
        let parsed = record(&input, integer).unwrap();
        assert_eq!(parsed["a"], 1);
        assert_eq!(parsed["b"], 2);

        let input = json!({ "a": 1, "b": "2", "c": false });
        assert_eq!(record(&input, integer).unwrap_err().shape_keys(), vec!["b", "c"]);
    }

    #[test]
    fn record_strict_remaps_and_rejects_keys() {
        let to_index = |key: &str| {
            key.parse::<u8>().map_err(|_| ValidationError::mismatch("numeric key", key))
        };

        let input = json!({ "1": "a", "2": "b" });
        let parsed = record_strict(&input, to_index, string).unwrap();
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec![(1, "a"), (2, "b")]);

        let input = json!({ "1": "a", "x": "b", "y": 3 });
        match record_strict(&input, to_index, string).unwrap_err() {
            ValidationError::Keys(keys) => {
                assert_eq!(keys.keys().collect::<Vec<_>>(), vec!["x", "y"])
            }
            other => panic!("unexpected {other:?}"),
        }

        let input = json!({ "01": "a", "1": "b" });
        assert!(matches!(
            record_strict(&input, to_index, string),
            Err(ValidationError::Keys(_))
        ));
    }
}
