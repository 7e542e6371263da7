use super::{types::*, LedgerHandle, LedgerTransport};
use crate::hardware::DeviceSession;

use custodian_core::types::{Signature, TypedData, TypedDataVersion};
use futures_util::lock::Mutex;
use std::fmt;
use tracing::{debug, trace};

/// A Ledger Ethereum App.
///
/// Every signing operation opens its own connection through the transport and holds the
/// device lock until that connection is closed, so concurrent requests reach the device
/// one at a time.
pub struct LedgerSigner {
    transport: Box<dyn LedgerTransport>,
    lock: Mutex<()>,
}

impl fmt::Debug for LedgerSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerSigner").finish_non_exhaustive()
    }
}

impl LedgerSigner {
    pub fn new<T: LedgerTransport + 'static>(transport: T) -> Self {
        Self { transport: Box::new(transport), lock: Mutex::new(()) }
    }

    async fn session(&self) -> Result<DeviceSession<'_, dyn LedgerHandle>, LedgerError> {
        let guard = self.lock.lock().await;
        let handle = self.transport.open().await?;
        Ok(DeviceSession::new(guard, handle))
    }

    /// Signs an EIP-191 personal message (requires confirmation on the ledger)
    pub async fn sign_message(
        &self,
        derivation: &DerivationType,
        message: &[u8],
    ) -> Result<Signature, LedgerError> {
        let path = derivation.to_string();
        let message = hex::encode(message);

        let mut session = self.session().await?;
        debug!(%path, "signing personal message on ledger");
        let raw = session.sign_personal_message(&path, &message).await?;

        let signature = Signature::from_raw(&raw)?;
        trace!(%signature, "ledger signature");
        Ok(signature)
    }

    /// Signs typed data. Both hashes are computed locally, the device only sees the hashes.
    pub async fn sign_typed_data(
        &self,
        derivation: &DerivationType,
        payload: &TypedData,
        version: TypedDataVersion,
    ) -> Result<Signature, LedgerError> {
        let path = derivation.to_string();
        let hashes = payload.hashes(version)?;
        let struct_hash = hashes.struct_hash.ok_or(LedgerError::MissingStructHash)?;
        let domain_separator = hex::encode(hashes.domain_separator);
        let struct_hash = hex::encode(struct_hash);

        let mut session = self.session().await?;
        debug!(%path, ?version, "signing typed data hashes on ledger");
        let raw = session.sign_typed_data_hash(&path, &domain_separator, &struct_hash).await?;

        let signature = Signature::from_raw(&raw)?;
        trace!(%signature, "ledger signature");
        Ok(signature)
    }
}
