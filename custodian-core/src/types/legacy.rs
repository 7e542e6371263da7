//! The original, pre-EIP-712 `eth_signTypedData` format.
//!
//! A document is a flat list of `{ type, name, value }` entries. Its hash is
//! `keccak256(keccak256(packed "type name" strings) ‖ keccak256(packed values))`, where
//! packing is Solidity's `abi.encodePacked`.
use super::primitive::Primitive;
use crate::{
    shape,
    types::{eip712::Eip712Error, H256},
    utils::{keccak256, keccak256_concat},
    validation::{array_of, field, object, string, ValidationError},
};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    pub r#type: String,
    pub name: String,
    pub value: Value,
}

/// A version 1 typed-data document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTypedData {
    pub entries: Vec<LegacyEntry>,
}

impl LegacyTypedData {
    pub fn from_json_str(document: &str) -> Result<Self, Eip712Error> {
        let value: Value = serde_json::from_str(document)?;
        Ok(Self::parse(&value)?)
    }

    /// Validates a non-empty list of named entries
    pub fn parse(input: &Value) -> Result<Self, ValidationError> {
        let entries = array_of(input, |entry| {
            let obj = object(entry)?;
            let (r#type, name, value) = shape! {
                r#type: field(obj, "type").and_then(string),
                name: field(obj, "name").and_then(string),
                value: field(obj, "value"),
            }?;
            if name.is_empty() {
                return Err(ValidationError::mismatch("non-empty name", "\"\""))
            }
            Ok(LegacyEntry { r#type: r#type.to_owned(), name: name.to_owned(), value: value.clone() })
        })?;
        if entries.is_empty() {
            return Err(ValidationError::mismatch("at least one entry", input))
        }
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|e| json!({ "type": e.r#type, "name": e.name, "value": e.value }))
                .collect(),
        )
    }

    /// The digest that is actually signed
    pub fn hash(&self) -> Result<H256, Eip712Error> {
        let schema = keccak256_concat(self.entries.iter().map(|e| format!("{} {}", e.r#type, e.name)));

        let values = self
            .entries
            .iter()
            .map(|e| {
                let primitive = Primitive::parse(&e.r#type)
                    .ok_or_else(|| Eip712Error::UnsupportedType(e.r#type.clone()))?;
                primitive
                    .encode_packed(&e.value)
                    .map_err(|source| Eip712Error::InvalidValue { field: e.name.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(H256(keccak256_concat([schema, keccak256_concat(values)])))
    }
}
