//! Signing requests as they arrive over JSON-RPC.
use custodian_core::{
    shape,
    types::Address,
    validation::{address, array, string, ValidationError},
};
use serde_json::Value;
use thiserror::Error;

pub const PERSONAL_SIGN: &str = "personal_sign";
pub const SIGN_TYPED_DATA_V1: &str = "eth_signTypedData";
pub const SIGN_TYPED_DATA_V3: &str = "eth_signTypedData_v3";
pub const SIGN_TYPED_DATA_V4: &str = "eth_signTypedData_v4";

/// A user-approved signing action. Typed-data documents stay JSON text until signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignRequest {
    PersonalSign { message: Vec<u8> },
    SignTypedDataV1 { document: String },
    SignTypedDataV3 { document: String },
    SignTypedDataV4 { document: String },
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("unsupported signing method `{0}`")]
    UnknownMethod(String),
    #[error("invalid params: {0}")]
    Invalid(#[from] ValidationError),
}

impl SignRequest {
    /// The JSON-RPC method that carries this request
    pub fn method(&self) -> &'static str {
        match self {
            SignRequest::PersonalSign { .. } => PERSONAL_SIGN,
            SignRequest::SignTypedDataV1 { .. } => SIGN_TYPED_DATA_V1,
            SignRequest::SignTypedDataV3 { .. } => SIGN_TYPED_DATA_V3,
            SignRequest::SignTypedDataV4 { .. } => SIGN_TYPED_DATA_V4,
        }
    }

    /// Parses the params of a signing method into the request and the account it names.
    ///
    /// `personal_sign` and `eth_signTypedData` take `[payload, account]`, the `_v3` and `_v4`
    /// methods take `[account, payload]`.
    pub fn from_rpc(method: &str, params: &Value) -> Result<(Address, Self), RequestError> {
        let params = array(params)?;
        let at = |index: usize| {
            params.get(index).ok_or_else(|| ValidationError::MissingField(format!("params[{index}]")))
        };

        let (account, request) = match method {
            PERSONAL_SIGN => {
                let (message, account) = shape! {
                    message: at(0).and_then(string).map(message_bytes),
                    account: at(1).and_then(address),
                }?;
                (account, SignRequest::PersonalSign { message })
            }
            SIGN_TYPED_DATA_V1 => {
                let (document, account) = shape! {
                    document: at(0).map(document_text),
                    account: at(1).and_then(address),
                }?;
                (account, SignRequest::SignTypedDataV1 { document })
            }
            SIGN_TYPED_DATA_V3 | SIGN_TYPED_DATA_V4 => {
                let (account, document) = shape! {
                    account: at(0).and_then(address),
                    document: at(1).map(document_text),
                }?;
                let request = if method == SIGN_TYPED_DATA_V3 {
                    SignRequest::SignTypedDataV3 { document }
                } else {
                    SignRequest::SignTypedDataV4 { document }
                };
                (account, request)
            }
            other => return Err(RequestError::UnknownMethod(other.to_string())),
        };
        Ok((account, request))
    }
}

/// `0x` hex is decoded, anything else is signed as its UTF-8 bytes
fn message_bytes(message: &str) -> Vec<u8> {
    message
        .strip_prefix("0x")
        .and_then(|hex| hex::decode(hex).ok())
        .unwrap_or_else(|| message.as_bytes().to_vec())
}

/// Documents are usually JSON text; some dapps send the object itself
fn document_text(document: &Value) -> String {
    match document {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
