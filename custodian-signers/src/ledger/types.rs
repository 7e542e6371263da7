#![allow(clippy::upper_case_acronyms)]
//! Helpers for interacting with the Ethereum Ledger App
//! [Official Docs](https://github.com/LedgerHQ/app-ethereum/blob/master/doc/ethapp.asc)
use crate::hardware::{classify_ledger_failure, DeviceError, DeviceFailure};
use custodian_core::types::{Eip712Error, SignatureError};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ledger wallet type
pub enum DerivationType {
    /// Ledger Live-generated HD path
    LedgerLive(usize),
    /// Legacy generated HD Path
    Legacy(usize),
    /// Any other path
    Other(String),
}

impl fmt::Display for DerivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DerivationType::Legacy(index) => write!(f, "m/44'/60'/0'/{index}"),
            DerivationType::LedgerLive(index) => write!(f, "m/44'/60'/{index}'/0/0"),
            DerivationType::Other(inner) => f.write_str(inner),
        }
    }
}

#[derive(Error, Debug)]
/// Error when using the Ledger transport
pub enum LedgerError {
    /// Underlying ledger transport error
    #[cfg(feature = "ledger")]
    #[error(transparent)]
    LedgerError(#[from] coins_ledger::errors::LedgerError),
    /// The device answered with an error status
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// Device response was unexpectedly none
    #[error("Received unexpected response from device. Expected data in response, found none.")]
    UnexpectedNullResponse,
    #[error(transparent)]
    /// Error when converting from a hex string
    HexError(#[from] hex::FromHexError),
    /// The typed data could not be hashed
    #[error(transparent)]
    Eip712Error(#[from] Eip712Error),
    /// The device returned signature parts that do not form a signature
    #[error(transparent)]
    SignatureError(#[from] SignatureError),
    /// The device only signs a domain separator together with a message hash
    #[error("typed data whose primary type is the domain has no message hash to sign")]
    MissingStructHash,
    #[error("invalid derivation path `{0}`")]
    InvalidPath(String),
    /// Got a response, but it didn't contain as much data as expected
    #[error("Cannot deserialize ledger response, insufficient bytes. Got {got} expected at least {at_least}")]
    ShortResponse { got: usize, at_least: usize },
    /// Payload is empty
    #[error("Payload must not be empty")]
    EmptyPayload,
}

impl LedgerError {
    /// The recognized meaning of a device status, if any
    pub fn failure(&self) -> Option<DeviceFailure> {
        match self {
            LedgerError::Device(err) => classify_ledger_failure(&err.payload).ok(),
            _ => None,
        }
    }
}

pub const P1_FIRST: u8 = 0x00;

/// Status word of a successful exchange
pub const SW_OK: u16 = 0x9000;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum INS {
    SIGN_PERSONAL_MESSAGE = 0x08,
    SIGN_ETH_EIP_712 = 0x0C,
}

impl fmt::Display for INS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            INS::SIGN_PERSONAL_MESSAGE => write!(f, "SIGN_PERSONAL_MESSAGE"),
            INS::SIGN_ETH_EIP_712 => write!(f, "SIGN_ETH_EIP_712"),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone)]
#[allow(non_camel_case_types)]
pub enum P1 {
    MORE = 0x80,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone)]
#[allow(non_camel_case_types)]
pub enum P2 {
    NO_CHAINCODE = 0x00,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_paths() {
        assert_eq!(DerivationType::LedgerLive(2).to_string(), "m/44'/60'/2'/0/0");
        assert_eq!(DerivationType::Legacy(3).to_string(), "m/44'/60'/0'/3");
        assert_eq!(DerivationType::Other("m/1/2".into()).to_string(), "m/1/2");
    }

    #[test]
    fn reads_device_failures() {
        let rejected = LedgerError::Device(DeviceError::new(json!({ "statusCode": 0x6985 })));
        assert_eq!(rejected.failure(), Some(DeviceFailure::UserRejected));
        assert_eq!(LedgerError::EmptyPayload.failure(), None);
    }
}
