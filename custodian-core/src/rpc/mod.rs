//! JSON-RPC error objects and the node-rejection classifier.
//!
//! Nodes report rejected requests as `{ code, message }` objects whose `message` text is the
//! only reliable discriminator. [`classify`] runs an ordered table of conditions, each a small
//! parser over the raw error object, and returns the first one that matches.
use crate::validation::{
    code_in, contains_ignore_case, field, integer, object, one_of, starts_with_ignore_case,
    string, NoneSucceeded, ValidationError,
};
use crate::shape;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Geth's generic "server error" code
pub const SERVER_ERROR: i64 = -32000;
/// JSON-RPC 2.0 invalid params
pub const INVALID_PARAMS: i64 = -32602;
/// Code used by geth for `eth_call` / `eth_estimateGas` reverts carrying data
pub const EXECUTION_ERROR: i64 = 3;

/// A JSON-RPC 2.0 error
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Error)]
pub struct JsonRpcError {
    /// The error code
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Parses an untrusted error object. Extra fields are ignored; `data` is optional.
    pub fn parse(input: &Value) -> Result<Self, ValidationError> {
        let obj = object(input)?;
        let (code, message) = shape! {
            code: field(obj, "code").and_then(integer),
            message: field(obj, "message").and_then(string),
        }?;
        let data = obj.get("data").filter(|data| !data.is_null()).cloned();
        Ok(Self { code, message: message.to_owned(), data })
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {}, message: {}, data: {:?})", self.code, self.message, self.data)
    }
}

/// A classified node rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("nonce too low")]
    NonceTooLow,
    #[error("nonce too high")]
    NonceTooHigh,
    #[error("replacement transaction underpriced")]
    ReplacementUnderpriced,
    #[error("transaction underpriced")]
    TransactionUnderpriced,
    #[error("insufficient funds")]
    InsufficientFunds,
    /// Revert data, if the node attached any
    #[error("execution reverted")]
    ExecutionReverted { data: Option<Value> },
    #[error("intrinsic gas too low")]
    IntrinsicGasTooLow,
    #[error("gas required exceeds allowance")]
    GasRequiredExceedsAllowance,
    #[error("max fee per gas less than block base fee")]
    FeeCapBelowBaseFee,
    #[error("max priority fee per gas higher than max fee per gas")]
    PriorityFeeAboveFeeCap,
    #[error("transaction already known")]
    AlreadyKnown,
    #[error("exceeds block gas limit")]
    ExceedsBlockGasLimit,
    #[error("transaction type not supported")]
    TxTypeNotSupported,
    /// The raw error did not match any known condition
    #[error("unrecognized node error: {0}")]
    Unrecognized(Value),
}

/// What a caller should do about a rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Resubmit, typically with a higher price
    Retry,
    /// The node already has the transaction; treat as accepted
    Ignore,
    /// Surface to the user
    Fatal,
}

impl WireError {
    /// Classifies `response`, falling back to [`WireError::Unrecognized`].
    pub fn from_response(response: &Value) -> Self {
        classify(response).unwrap_or_else(|_| Self::Unrecognized(response.clone()))
    }

    pub fn disposition(&self) -> Disposition {
        match self {
            Self::ReplacementUnderpriced | Self::TransactionUnderpriced => Disposition::Retry,
            Self::NonceTooLow | Self::AlreadyKnown => Disposition::Ignore,
            Self::InvalidArgument |
            Self::NonceTooHigh |
            Self::InsufficientFunds |
            Self::ExecutionReverted { .. } |
            Self::IntrinsicGasTooLow |
            Self::GasRequiredExceedsAllowance |
            Self::FeeCapBelowBaseFee |
            Self::PriorityFeeAboveFeeCap |
            Self::ExceedsBlockGasLimit |
            Self::TxTypeNotSupported |
            Self::Unrecognized(_) => Disposition::Fatal,
        }
    }

    /// Text suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            Self::Unrecognized(_) => "request failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Prefix(&'static str),
    Contains(&'static str),
}

impl Pattern {
    fn matches<'a>(&self, message: &'a str) -> Result<&'a str, ValidationError> {
        match *self {
            Pattern::Prefix(prefix) => starts_with_ignore_case(message, prefix),
            Pattern::Contains(needle) => contains_ignore_case(message, needle),
        }
    }
}

/// One known rejection: acceptable codes, acceptable phrasings, and the resulting variant.
struct Condition {
    codes: &'static [i64],
    patterns: &'static [Pattern],
    build: fn(JsonRpcError) -> WireError,
}

impl Condition {
    fn parse(&self, input: &Value) -> Result<WireError, ValidationError> {
        let err = JsonRpcError::parse(input)?;
        code_in(err.code, self.codes)?;
        one_of(self.patterns.iter().map(|pattern| pattern.matches(&err.message)))?;
        Ok((self.build)(err))
    }
}

const fn server(patterns: &'static [Pattern], build: fn(JsonRpcError) -> WireError) -> Condition {
    Condition { codes: &[SERVER_ERROR], patterns, build }
}

use Pattern::{Contains, Prefix};

// Order matters: the first matching condition wins.
static CONDITIONS: &[Condition] = &[
    Condition {
        codes: &[INVALID_PARAMS],
        patterns: &[Prefix("invalid argument")],
        build: |_| WireError::InvalidArgument,
    },
    server(&[Prefix("nonce too low")], |_| WireError::NonceTooLow),
    server(&[Prefix("nonce too high")], |_| WireError::NonceTooHigh),
    server(&[Prefix("replacement transaction underpriced")], |_| {
        WireError::ReplacementUnderpriced
    }),
    server(&[Prefix("transaction underpriced")], |_| WireError::TransactionUnderpriced),
    server(
        &[
            Prefix("insufficient funds for gas * price + value"),
            Prefix("insufficient funds for transfer"),
        ],
        |_| WireError::InsufficientFunds,
    ),
    Condition {
        codes: &[SERVER_ERROR, EXECUTION_ERROR],
        patterns: &[Prefix("execution reverted")],
        build: |err| WireError::ExecutionReverted { data: err.data },
    },
    server(&[Prefix("intrinsic gas too low")], |_| WireError::IntrinsicGasTooLow),
    server(&[Prefix("gas required exceeds allowance")], |_| {
        WireError::GasRequiredExceedsAllowance
    }),
    server(&[Prefix("max fee per gas less than block base fee")], |_| {
        WireError::FeeCapBelowBaseFee
    }),
    server(&[Contains("max priority fee per gas higher than max fee per gas")], |_| {
        WireError::PriorityFeeAboveFeeCap
    }),
    server(&[Prefix("already known"), Prefix("known transaction")], |_| WireError::AlreadyKnown),
    server(&[Contains("exceeds block gas limit")], |_| WireError::ExceedsBlockGasLimit),
    server(&[Prefix("transaction type not supported")], |_| WireError::TxTypeNotSupported),
];

/// Classifies a raw JSON-RPC error object.
///
/// Conditions are tried in a fixed order and the first match wins. If none matches, the
/// failure carries one reason per condition, in table order.
pub fn classify(input: &Value) -> Result<WireError, NoneSucceeded<ValidationError>> {
    one_of(CONDITIONS.iter().map(|condition| condition.parse(input)))
}
