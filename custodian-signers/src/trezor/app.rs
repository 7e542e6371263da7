use super::{types::*, TrezorHandle, TrezorTransport};
use crate::hardware::{DeviceFailure, DeviceSession};

use custodian_core::types::{Signature, TypedData};
use futures_util::lock::Mutex;
use std::fmt;
use tracing::{debug, trace};

/// A Trezor reached through the Trezor Connect bridge.
pub struct TrezorSigner {
    transport: Box<dyn TrezorTransport>,
    lock: Mutex<()>,
}

impl fmt::Debug for TrezorSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrezorSigner").finish_non_exhaustive()
    }
}

impl TrezorSigner {
    pub fn new<T: TrezorTransport + 'static>(transport: T) -> Self {
        Self { transport: Box::new(transport), lock: Mutex::new(()) }
    }

    /// Opens and initializes a connection. A bridge that an earlier session already
    /// initialized is ready for use; any other initialization failure aborts.
    async fn session(&self) -> Result<DeviceSession<'_, dyn TrezorHandle>, TrezorError> {
        let guard = self.lock.lock().await;
        let handle = self.transport.open().await?;
        let mut session = DeviceSession::new(guard, handle);

        if let Err(err) = session.init().await {
            match err.failure() {
                Some(DeviceFailure::AlreadyInitialized) => {
                    debug!("trezor bridge already initialized")
                }
                _ => return Err(err),
            }
        }
        Ok(session)
    }

    /// Signs an EIP-191 personal message
    pub async fn sign_message(
        &self,
        derivation: &DerivationType,
        message: &[u8],
    ) -> Result<Signature, TrezorError> {
        let path = derivation.to_string();
        let message = hex::encode(message);

        let mut session = self.session().await?;
        debug!(%path, "signing personal message on trezor");
        let signature = session.sign_message(&path, &message).await?;

        let signature = signature.parse::<Signature>()?;
        trace!(%signature, "trezor signature");
        Ok(signature)
    }

    /// Hands the whole document to the device. `metamask_v4_compat` makes the firmware apply
    /// the V4 encoding rules.
    pub async fn sign_typed_data(
        &self,
        derivation: &DerivationType,
        payload: &TypedData,
        metamask_v4_compat: bool,
    ) -> Result<Signature, TrezorError> {
        let path = derivation.to_string();
        let document = payload.to_value();

        let mut session = self.session().await?;
        debug!(%path, metamask_v4_compat, "signing typed data on trezor");
        let signature = session.sign_typed_data(&path, &document, metamask_v4_compat).await?;

        let signature = signature.parse::<Signature>()?;
        trace!(%signature, "trezor signature");
        Ok(signature)
    }
}
