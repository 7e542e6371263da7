//! Where the key behind an account lives.
use crate::{
    ledger::types::DerivationType as LedgerPath,
    safe::ProxyCustody,
    trezor::types::DerivationType as TrezorPath,
    wallet::{MnemonicBuilder, Wallet, WalletError, DEFAULT_DERIVATION_PATH_PREFIX},
};
use coins_bip39::English;
use std::fmt;
use thiserror::Error;

/// The custody of one account's key. Read-only once the account exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCustody {
    LocalSecretPhrase(SecretPhrase),
    LocalPrivateKey(PrivateKey),
    HardwareLedger { derivation: LedgerPath },
    HardwareTrezor { derivation: TrezorPath },
    /// A smart-contract wallet whose owner signs on its behalf
    SmartContractProxy(ProxyCustody),
}

impl KeyCustody {
    /// Short name for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            KeyCustody::LocalSecretPhrase(_) => "secret phrase",
            KeyCustody::LocalPrivateKey(_) => "private key",
            KeyCustody::HardwareLedger { .. } => "ledger",
            KeyCustody::HardwareTrezor { .. } => "trezor",
            KeyCustody::SmartContractProxy(_) => "smart contract proxy",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("a smart contract proxy cannot be owned by another proxy")]
    NestedProxy,
}

/// A BIP-39 secret phrase and the path of the account's key
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPhrase {
    phrase: String,
    derivation_path: String,
    password: Option<String>,
}

impl SecretPhrase {
    /// Uses the first account, `m/44'/60'/0'/0/0`
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            derivation_path: format!("{DEFAULT_DERIVATION_PATH_PREFIX}0"),
            password: None,
        }
    }

    #[must_use]
    pub fn index(mut self, index: u32) -> Self {
        self.derivation_path = format!("{DEFAULT_DERIVATION_PATH_PREFIX}{index}");
        self
    }

    #[must_use]
    pub fn derivation_path(mut self, path: impl Into<String>) -> Self {
        self.derivation_path = path.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn wallet(&self) -> Result<Wallet, WalletError> {
        let builder = MnemonicBuilder::<English>::default()
            .phrase(self.phrase.as_str())
            .derivation_path(&self.derivation_path)?;
        match self.password {
            Some(ref password) => builder.password(password).build(),
            None => builder.build(),
        }
    }
}

// do not log the phrase
impl fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPhrase")
            .field("derivation_path", &self.derivation_path)
            .finish_non_exhaustive()
    }
}

/// A hex-encoded secp256k1 secret key
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn wallet(&self) -> Result<Wallet, WalletError> {
        self.0.parse()
    }
}

// do not log the key
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}
