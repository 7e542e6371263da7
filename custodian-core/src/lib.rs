#![cfg_attr(docsrs, feature(doc_cfg))]
//! Core types and pure functions shared by every custody backend.
//!
//! Everything in this crate is side-effect free: parsers return their failures as values
//! instead of panicking, which lets callers treat untrusted JSON (node responses, dapp
//! payloads, device error objects) as plain data.
//!
//! ## Validating untrusted data
//!
//! ```rust
//! use custodian_core::{shape, validation::{field, integer, object, string, ValidationError}};
//! use serde_json::json;
//!
//! fn parse(input: &serde_json::Value) -> Result<(i64, String), ValidationError> {
//!     let obj = object(input)?;
//!     let (code, message) = shape! {
//!         code: field(obj, "code").and_then(integer),
//!         message: field(obj, "message").and_then(string).map(str::to_owned),
//!     }?;
//!     Ok((code, message))
//! }
//!
//! assert!(parse(&json!({ "code": -32000, "message": "nonce too low" })).is_ok());
//! // both fields are reported at once
//! let err = parse(&json!({ "code": "x" })).unwrap_err();
//! assert_eq!(err.shape_keys(), vec!["code", "message"]);
//! ```
//!
//! ## Hashing typed data
//!
//! [`types::TypedData`] implements the EIP-712 `hashStruct` and domain separator algorithms
//! for the MetaMask `v3` and `v4` dialects, and [`types::LegacyTypedData`] implements the
//! original `eth_signTypedData` (v1) hash.
pub mod validation;

pub mod rpc;

pub mod types;

/// Various utilities
pub mod utils;

// re-export k256
pub use k256;

// re-export the ABI word encoder
pub use ethabi as abi;
