use crate::{
    hardware::DeviceFailure, ledger::types::LedgerError, trezor::types::TrezorError,
    wallet::WalletError,
};
use custodian_core::types::Eip712Error;
use thiserror::Error;

/// Failure of a [`SigningDispatcher::sign`](crate::SigningDispatcher::sign) call
#[derive(Error, Debug)]
pub enum SignError {
    /// The custody cannot produce this kind of signature. Retrying cannot help.
    #[error("{method} is not supported by this wallet type")]
    NotSupported { method: &'static str, custody: &'static str },
    /// The dispatcher was built without a transport for this device family
    #[error("no {0} transport is configured")]
    TransportUnavailable(&'static str),
    /// A proxy was found where an owner key was expected
    #[error("a smart contract proxy cannot sign for another proxy")]
    NestedProxy,
    #[error("the proxy envelope needs a chain id")]
    MissingChainId,
    /// The typed-data document is not valid JSON or not a valid document
    #[error(transparent)]
    TypedData(#[from] Eip712Error),
    /// Key derivation or local signing failed
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Trezor(#[from] TrezorError),
}

impl SignError {
    /// The recognized meaning of a device failure, if any
    pub fn device_failure(&self) -> Option<DeviceFailure> {
        match self {
            SignError::Ledger(err) => err.failure(),
            SignError::Trezor(err) => err.failure(),
            _ => None,
        }
    }

    /// Whether a fresh `sign` call may succeed, e.g. once the device is unlocked
    pub fn is_retryable(&self) -> bool {
        match self {
            SignError::Ledger(LedgerError::Device(_)) | SignError::Trezor(TrezorError::Device(_)) => {
                self.device_failure() != Some(DeviceFailure::UserRejected)
            }
            #[cfg(feature = "ledger")]
            SignError::Ledger(LedgerError::LedgerError(_)) => true,
            _ => false,
        }
    }

    /// Text to show the user
    pub fn user_message(&self) -> String {
        match self.device_failure() {
            Some(failure) => failure.user_message().to_string(),
            None => self.to_string(),
        }
    }
}
