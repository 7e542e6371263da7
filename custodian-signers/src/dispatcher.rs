//! Routes a signing request to the backend that holds the key.
use crate::{
    config::SignerConfig,
    custody::KeyCustody,
    error::SignError,
    ledger::app::LedgerSigner,
    request::{SignRequest, PERSONAL_SIGN, SIGN_TYPED_DATA_V1},
    trezor::app::TrezorSigner,
};
use custodian_core::types::{LegacyTypedData, Signature, TypedData, TypedDataVersion};
use tracing::{instrument, trace};

/// Produces exactly one signature per [`sign`](Self::sign) call, from whichever custody holds
/// the account's key.
///
/// | custody | `personal_sign` | typed data v1 | typed data v3 / v4 |
/// |---|---|---|---|
/// | secret phrase, private key | signed locally | signed locally | signed locally |
/// | Ledger | on device | not supported | hashes computed locally, signed on device |
/// | Trezor | on device | not supported | document signed on device |
/// | smart contract proxy | not supported | not supported | `SafeMessage` envelope signed by the owner |
#[derive(Debug, Default)]
pub struct SigningDispatcher {
    ledger: Option<LedgerSigner>,
    trezor: Option<TrezorSigner>,
    config: SignerConfig,
}

/// Builds a [`SigningDispatcher`]
#[derive(Debug, Default)]
#[must_use]
pub struct SigningDispatcherBuilder {
    inner: SigningDispatcher,
}

impl SigningDispatcherBuilder {
    pub fn ledger(mut self, ledger: LedgerSigner) -> Self {
        self.inner.ledger = Some(ledger);
        self
    }

    pub fn trezor(mut self, trezor: TrezorSigner) -> Self {
        self.inner.trezor = Some(trezor);
        self
    }

    pub fn config(mut self, config: SignerConfig) -> Self {
        self.inner.config = config;
        self
    }

    pub fn build(self) -> SigningDispatcher {
        self.inner
    }
}

impl SigningDispatcher {
    pub fn builder() -> SigningDispatcherBuilder {
        SigningDispatcherBuilder::default()
    }

    /// Signs `request` with the key held by `custody`.
    ///
    /// Unsupported pairs fail with [`SignError::NotSupported`] before any device is opened.
    #[instrument(skip_all, fields(method = request.method(), custody = custody.kind()))]
    pub async fn sign(
        &self,
        request: &SignRequest,
        custody: &KeyCustody,
    ) -> Result<Signature, SignError> {
        let signature = match request {
            SignRequest::PersonalSign { message } => self.sign_personal(message, custody).await,
            SignRequest::SignTypedDataV1 { document } => self.sign_legacy(document, custody),
            SignRequest::SignTypedDataV3 { document } => {
                self.sign_typed(document, TypedDataVersion::V3, custody).await
            }
            SignRequest::SignTypedDataV4 { document } => {
                self.sign_typed(document, TypedDataVersion::V4, custody).await
            }
        }?;
        trace!(%signature, "signed");
        Ok(signature)
    }

    async fn sign_personal(
        &self,
        message: &[u8],
        custody: &KeyCustody,
    ) -> Result<Signature, SignError> {
        match custody {
            KeyCustody::LocalSecretPhrase(phrase) => Ok(phrase.wallet()?.sign_message(message)?),
            KeyCustody::LocalPrivateKey(key) => Ok(key.wallet()?.sign_message(message)?),
            KeyCustody::HardwareLedger { derivation } => {
                Ok(self.ledger()?.sign_message(derivation, message).await?)
            }
            KeyCustody::HardwareTrezor { derivation } => {
                Ok(self.trezor()?.sign_message(derivation, message).await?)
            }
            KeyCustody::SmartContractProxy(_) => Err(not_supported(PERSONAL_SIGN, custody)),
        }
    }

    fn sign_legacy(&self, document: &str, custody: &KeyCustody) -> Result<Signature, SignError> {
        match custody {
            KeyCustody::LocalSecretPhrase(phrase) => {
                let payload = LegacyTypedData::from_json_str(document)?;
                Ok(phrase.wallet()?.sign_legacy_typed_data(&payload)?)
            }
            KeyCustody::LocalPrivateKey(key) => {
                let payload = LegacyTypedData::from_json_str(document)?;
                Ok(key.wallet()?.sign_legacy_typed_data(&payload)?)
            }
            KeyCustody::HardwareLedger { .. } |
            KeyCustody::HardwareTrezor { .. } |
            KeyCustody::SmartContractProxy(_) => Err(not_supported(SIGN_TYPED_DATA_V1, custody)),
        }
    }

    async fn sign_typed(
        &self,
        document: &str,
        version: TypedDataVersion,
        custody: &KeyCustody,
    ) -> Result<Signature, SignError> {
        let payload = TypedData::from_json_str(document)?;
        match custody {
            KeyCustody::SmartContractProxy(proxy) => {
                let envelope =
                    proxy.envelope(&payload, version, self.config.proxy_fallback_chain_id)?;
                self.sign_as_owner(&envelope, TypedDataVersion::V4, proxy.owner()).await
            }
            owner => self.sign_as_owner(&payload, version, owner).await,
        }
    }

    /// Typed-data signing by a key-holding custody. A proxy is not a valid owner.
    async fn sign_as_owner(
        &self,
        payload: &TypedData,
        version: TypedDataVersion,
        custody: &KeyCustody,
    ) -> Result<Signature, SignError> {
        match custody {
            KeyCustody::LocalSecretPhrase(phrase) => {
                Ok(phrase.wallet()?.sign_typed_data(payload, version)?)
            }
            KeyCustody::LocalPrivateKey(key) => Ok(key.wallet()?.sign_typed_data(payload, version)?),
            KeyCustody::HardwareLedger { derivation } => {
                Ok(self.ledger()?.sign_typed_data(derivation, payload, version).await?)
            }
            KeyCustody::HardwareTrezor { derivation } => {
                let compat = self.config.trezor_metamask_v4_compat;
                Ok(self.trezor()?.sign_typed_data(derivation, payload, compat).await?)
            }
            KeyCustody::SmartContractProxy(_) => Err(SignError::NestedProxy),
        }
    }

    fn ledger(&self) -> Result<&LedgerSigner, SignError> {
        self.ledger.as_ref().ok_or(SignError::TransportUnavailable("ledger"))
    }

    fn trezor(&self) -> Result<&TrezorSigner, SignError> {
        self.trezor.as_ref().ok_or(SignError::TransportUnavailable("trezor"))
    }
}

fn not_supported(method: &'static str, custody: &KeyCustody) -> SignError {
    SignError::NotSupported { method, custody: custody.kind() }
}
