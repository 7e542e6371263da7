//! Deriving a wallet from a BIP-39 secret phrase
use super::{Wallet, WalletError};

use coins_bip32::path::DerivationPath;
use coins_bip39::{Mnemonic, Wordlist};
use custodian_core::{k256::ecdsa::SigningKey, utils::secret_key_to_address};
use std::{fmt, marker::PhantomData, str::FromStr};
use thiserror::Error;

pub(crate) const DEFAULT_DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Represents a structure that can resolve into a [`Wallet`].
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicBuilder<W: Wordlist> {
    /// The secret phrase. A builder that has a valid phrase should `build` the wallet.
    phrase: Option<String>,
    /// The derivation path at which the extended private key child will be derived at. By default
    /// the mnemonic builder uses the path: "m/44'/60'/0'/0/0".
    derivation_path: DerivationPath,
    /// Optional password for the mnemonic phrase.
    password: Option<String>,
    _wordlist: PhantomData<W>,
}

/// Error produced by the mnemonic wallet module
#[derive(Error, Debug)]
pub enum MnemonicBuilderError {
    /// Error suggests that a phrase was expected but not found
    #[error("Expected phrase not found")]
    ExpectedPhraseNotFound,
}

impl<W: Wordlist> Default for MnemonicBuilder<W> {
    fn default() -> Self {
        Self {
            phrase: None,
            derivation_path: DerivationPath::from_str(&format!(
                "{DEFAULT_DERIVATION_PATH_PREFIX}0"
            ))
            .expect("should parse the default derivation path"),
            password: None,
            _wordlist: PhantomData,
        }
    }
}

// the phrase and password are secrets
impl<W: Wordlist> fmt::Debug for MnemonicBuilder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicBuilder")
            .field("derivation_path", &self.derivation_path)
            .finish_non_exhaustive()
    }
}

impl<W: Wordlist> MnemonicBuilder<W> {
    /// Sets the phrase in the mnemonic builder. Once a phrase is provided, the key will be
    /// generated deterministically by calling the `build` method.
    ///
    /// # Example
    ///
    /// ```
    /// use custodian_signers::{coins_bip39::English, MnemonicBuilder};
    /// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
    ///
    /// let wallet = MnemonicBuilder::<English>::default()
    ///     .phrase("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about")
    ///     .build()?;
    ///
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn phrase<P: Into<String>>(mut self, phrase: P) -> Self {
        self.phrase = Some(phrase.into());
        self
    }

    /// Sets the derivation path of the child key to be derived. The derivation path is calculated
    /// using the default derivation path prefix used in Ethereum, i.e. "m/44'/60'/0'/0/{index}".
    pub fn index<U: Into<u32>>(mut self, index: U) -> Result<Self, WalletError> {
        self.derivation_path =
            DerivationPath::from_str(&format!("{DEFAULT_DERIVATION_PATH_PREFIX}{}", index.into()))?;
        Ok(self)
    }

    /// Sets the derivation path of the child key to be derived.
    pub fn derivation_path(mut self, path: &str) -> Result<Self, WalletError> {
        self.derivation_path = DerivationPath::from_str(path)?;
        Ok(self)
    }

    /// Sets the password used to construct the seed from the mnemonic phrase.
    #[must_use]
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Builds a [`Wallet`] using the parameters set in mnemonic builder. This method expects
    /// the phrase field to be set.
    pub fn build(&self) -> Result<Wallet, WalletError> {
        let mnemonic = match &self.phrase {
            Some(phrase) => Mnemonic::<W>::new_from_phrase(phrase)?,
            None => return Err(MnemonicBuilderError::ExpectedPhraseNotFound.into()),
        };
        self.mnemonic_to_wallet(&mnemonic)
    }

    fn mnemonic_to_wallet(&self, mnemonic: &Mnemonic<W>) -> Result<Wallet, WalletError> {
        let derived_priv_key =
            mnemonic.derive_key(&self.derivation_path, self.password.as_deref())?;
        let key: &coins_bip32::prelude::SigningKey = derived_priv_key.as_ref();
        let signer = SigningKey::from_bytes(&key.to_bytes())?;
        let address = secret_key_to_address(&signer);

        Ok(Wallet { signer, address })
    }
}
