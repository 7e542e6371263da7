//! Leaf parsers over [`serde_json::Value`].
use super::ValidationError;
use crate::types::{Address, U256};
use serde_json::{Map, Value};

/// Returns the JSON kind of `value`, as used in error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(expected: &'static str, value: &Value) -> ValidationError {
    ValidationError::WrongType { expected, found: kind(value) }
}

pub fn object(input: &Value) -> Result<&Map<String, Value>, ValidationError> {
    input.as_object().ok_or_else(|| wrong_type("object", input))
}

pub fn array(input: &Value) -> Result<&[Value], ValidationError> {
    input.as_array().map(Vec::as_slice).ok_or_else(|| wrong_type("array", input))
}

pub fn string(input: &Value) -> Result<&str, ValidationError> {
    input.as_str().ok_or_else(|| wrong_type("string", input))
}

pub fn boolean(input: &Value) -> Result<bool, ValidationError> {
    input.as_bool().ok_or_else(|| wrong_type("boolean", input))
}

/// A JSON number that fits an `i64`
pub fn integer(input: &Value) -> Result<i64, ValidationError> {
    match input {
        Value::Number(num) => {
            num.as_i64().ok_or_else(|| ValidationError::mismatch("integer", num))
        }
        other => Err(wrong_type("number", other)),
    }
}

/// Looks up a required key
pub fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ValidationError> {
    obj.get(key).ok_or_else(|| ValidationError::MissingField(key.to_string()))
}

/// Looks up an optional key; an absent key and an explicit `null` both yield `None`.
pub fn optional<'a, T, E, F>(
    obj: &'a Map<String, Value>,
    key: &str,
    parser: F,
) -> Result<Option<T>, ValidationError>
where
    F: FnOnce(&'a Value) -> Result<T, E>,
    E: Into<ValidationError>,
{
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parser(value).map(Some).map_err(Into::into),
    }
}

/// Accepts exactly `expected`
pub fn literal<'a>(value: &'a str, expected: &str) -> Result<&'a str, ValidationError> {
    if value == expected {
        Ok(value)
    } else {
        Err(ValidationError::mismatch(format!("`{expected}`"), value))
    }
}

/// Accepts any code listed in `allowed`
pub fn code_in(code: i64, allowed: &[i64]) -> Result<i64, ValidationError> {
    if allowed.contains(&code) {
        Ok(code)
    } else {
        let allowed = allowed.iter().map(i64::to_string).collect::<Vec<_>>().join(" or ");
        Err(ValidationError::mismatch(format!("code {allowed}"), code))
    }
}

pub fn starts_with_ignore_case<'a>(
    value: &'a str,
    prefix: &str,
) -> Result<&'a str, ValidationError> {
    if value.to_lowercase().starts_with(&prefix.to_lowercase()) {
        Ok(value)
    } else {
        Err(ValidationError::mismatch(format!("text starting with `{prefix}`"), value))
    }
}

pub fn contains_ignore_case<'a>(value: &'a str, needle: &str) -> Result<&'a str, ValidationError> {
    if value.to_lowercase().contains(&needle.to_lowercase()) {
        Ok(value)
    } else {
        Err(ValidationError::mismatch(format!("text containing `{needle}`"), value))
    }
}

/// An unsigned 256-bit integer given as a JSON number, a decimal string or a `0x` hex string.
///
/// Dapps commonly stringify large integers, as ethers-js does.
pub fn numeric(input: &Value) -> Result<U256, ValidationError> {
    match input {
        Value::Number(num) => num
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| ValidationError::mismatch("unsigned integer", num)),
        Value::String(s) => numeric_str(s),
        other => Err(wrong_type("number or numeric string", other)),
    }
}

/// String form of [`numeric`]
pub fn numeric_str(s: &str) -> Result<U256, ValidationError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_dec_str(s).ok()
        }
        None => None,
    };
    parsed.ok_or_else(|| ValidationError::mismatch("unsigned integer", s))
}

/// A `0x`-prefixed hex string of exactly 20 bytes (checksum casing is not enforced)
pub fn address(input: &Value) -> Result<Address, ValidationError> {
    let s = string(input)?;
    let bytes = decode_prefixed_hex(s)?;
    if bytes.len() != 20 {
        return Err(ValidationError::mismatch("20-byte address", s))
    }
    Ok(Address::from_slice(&bytes))
}

/// A `0x`-prefixed hex string of any even length
pub fn hex_bytes(input: &Value) -> Result<Vec<u8>, ValidationError> {
    decode_prefixed_hex(string(input)?)
}

fn decode_prefixed_hex(s: &str) -> Result<Vec<u8>, ValidationError> {
    let hex = s.strip_prefix("0x").ok_or_else(|| ValidationError::mismatch("0x-prefixed hex", s))?;
    hex::decode(hex).map_err(|_| ValidationError::mismatch("0x-prefixed hex", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_wrong_kinds() {
        assert_eq!(
            string(&json!(1)),
            Err(ValidationError::WrongType { expected: "string", found: "number" })
        );
        assert_eq!(
            object(&json!(null)),
            Err(ValidationError::WrongType { expected: "object", found: "null" })
        );
        assert!(integer(&json!(1.5)).is_err());
        assert_eq!(integer(&json!(-32000)), Ok(-32000));
    }

    #[test]
    fn optional_treats_null_as_absent() {
        let input = json!({ "a": null, "b": "x", "c": 1 });
        let obj = object(&input).unwrap();
        assert_eq!(optional(obj, "a", string), Ok(None));
        assert_eq!(optional(obj, "missing", string), Ok(None));
        assert_eq!(optional(obj, "b", string), Ok(Some("x")));
        assert!(optional(obj, "c", string).is_err());
    }

    #[test]
    fn matches_text_ignoring_case() {
        assert!(starts_with_ignore_case("NONCE TOO LOW extra", "nonce too low").is_ok());
        assert!(starts_with_ignore_case("the nonce too low", "nonce too low").is_err());
        assert!(contains_ignore_case("err: Exceeds Block Gas Limit", "exceeds block gas limit")
            .is_ok());
    }

    #[test]
    fn parses_numeric_values() {
        assert_eq!(numeric(&json!(1)), Ok(U256::from(1)));
        assert_eq!(numeric(&json!("1658645591")), Ok(U256::from(1658645591u64)));
        assert_eq!(numeric(&json!("0x10")), Ok(U256::from(16)));
        assert!(numeric(&json!("-1")).is_err());
        assert!(numeric(&json!("0x")).is_err());
        assert!(numeric(&json!("12a")).is_err());
        assert!(numeric(&json!(-1)).is_err());
    }

    #[test]
    fn parses_addresses() {
        let addr = address(&json!("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")).unwrap();
        assert_eq!(hex::encode(addr), "cd2a3d9f938e13cd947ec05abc7fe734df8dd826");
        assert!(address(&json!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")).is_err());
        assert!(address(&json!("0x1234")).is_err());
    }
}
