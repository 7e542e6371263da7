//! Loading a wallet from a raw secp256k1 secret key
use super::{mnemonic::MnemonicBuilderError, Wallet};

use coins_bip32::Bip32Error;
use coins_bip39::MnemonicError;
use custodian_core::{
    k256::{
        ecdsa::{self, SigningKey},
        elliptic_curve::rand_core::CryptoRngCore,
    },
    types::Eip712Error,
    utils::secret_key_to_address,
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum WalletError {
    /// Error propagated from the BIP-32 crate
    #[error(transparent)]
    Bip32Error(#[from] Bip32Error),
    /// Error propagated from the BIP-39 crate
    #[error(transparent)]
    Bip39Error(#[from] MnemonicError),
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// Error propagated from the mnemonic builder module.
    #[error(transparent)]
    MnemonicBuilderError(#[from] MnemonicBuilderError),
    /// The typed data could not be hashed
    #[error(transparent)]
    Eip712Error(#[from] Eip712Error),
}

impl Wallet {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: CryptoRngCore>(rng: &mut R) -> Self {
        let signer = SigningKey::random(rng);
        let address = secret_key_to_address(&signer);
        Self { signer, address }
    }

    /// Creates a new Wallet instance from a raw scalar value (big endian).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let signer = SigningKey::from_slice(bytes)?;
        let address = secret_key_to_address(&signer);
        Ok(Self { signer, address })
    }
}

impl From<SigningKey> for Wallet {
    fn from(signer: SigningKey) -> Self {
        let address = secret_key_to_address(&signer);
        Self { signer, address }
    }
}

impl FromStr for Wallet {
    type Err = WalletError;

    /// Accepts 64 hex characters, with or without the `0x` prefix
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").unwrap_or(src);
        let bytes = hex::decode(src)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength.into())
        }
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<&str> for Wallet {
    type Error = WalletError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodian_core::types::Address;

    #[test]
    fn parses_private_keys() {
        let key = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let expected: Address = "2c7536e3605d9c16a7a3d7b1898e529396a65c23".parse().unwrap();

        let wallet: Wallet = key.parse().unwrap();
        assert_eq!(wallet.address, expected);
        let prefixed: Wallet = format!("0x{key}").parse().unwrap();
        assert_eq!(prefixed.address, expected);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!("0x1234".parse::<Wallet>(), Err(WalletError::HexError(_))));
        assert!(matches!("zz".repeat(32).parse::<Wallet>(), Err(WalletError::HexError(_))));
        // zero is not a valid scalar
        assert!(matches!("00".repeat(32).parse::<Wallet>(), Err(WalletError::EcdsaError(_))));
    }

    #[test]
    fn random_wallets_differ() {
        let mut rng = rand::thread_rng();
        let a = Wallet::new(&mut rng);
        let b = Wallet::new(&mut rng);
        assert_ne!(a.address, b.address);
    }
}
