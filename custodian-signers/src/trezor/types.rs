//! Helpers for interacting with Trezor devices through the Trezor Connect bridge
use crate::hardware::{classify_trezor_failure, DeviceError, DeviceFailure};
use custodian_core::types::SignatureError;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Trezor wallet type
pub enum DerivationType {
    /// Trezor Live-generated HD path
    TrezorLive(usize),
    /// Any other path. Attention! Trezor by default forbids custom derivation paths
    /// Run trezorctl set safety-checks prompt, to allow it
    Other(String),
}

impl fmt::Display for DerivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DerivationType::TrezorLive(index) => write!(f, "m/44'/60'/{index}'/0/0"),
            DerivationType::Other(inner) => f.write_str(inner),
        }
    }
}

#[derive(Error, Debug)]
/// Error when using the Trezor transport
pub enum TrezorError {
    /// The bridge reported a failure
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// The device returned something that is not a 65-byte signature
    #[error(transparent)]
    SignatureError(#[from] SignatureError),
}

impl TrezorError {
    /// The recognized meaning of a bridge failure, if any
    pub fn failure(&self) -> Option<DeviceFailure> {
        match self {
            TrezorError::Device(err) => classify_trezor_failure(&err.payload).ok(),
            TrezorError::SignatureError(_) => None,
        }
    }
}
