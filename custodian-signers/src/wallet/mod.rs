mod mnemonic;
pub(crate) use mnemonic::DEFAULT_DERIVATION_PATH_PREFIX;
pub use mnemonic::{MnemonicBuilder, MnemonicBuilderError};

mod private_key;
pub use private_key::WalletError;

use custodian_core::{
    k256::ecdsa::SigningKey,
    types::{Address, LegacyTypedData, Signature, TypedData, TypedDataVersion, H256, U256},
    utils::hash_message,
};
use std::fmt;

/// An Ethereum private-public key pair held in memory.
///
/// # Examples
///
/// ## Signing and Verifying a message
///
/// The wallet can be used to produce ECDSA [`Signature`] objects, which can be
/// then verified. Note that this uses [`hash_message`] under the hood which will
/// prefix the message being hashed with the `Ethereum Signed Message` domain separator.
///
/// ```
/// use custodian_signers::Wallet;
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet: Wallet =
///     "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse()?;
///
/// let message = b"hello";
/// let signature = wallet.sign_message(message)?;
/// assert_eq!(signature.recover(&message[..]).unwrap(), wallet.address());
/// # Ok(())
/// # }
/// ```
///
/// [`Signature`]: custodian_core::types::Signature
/// [`hash_message`]: fn@custodian_core::utils::hash_message
pub struct Wallet {
    /// The Wallet's private Key
    pub(crate) signer: SigningKey,
    /// The wallet's address
    pub(crate) address: Address,
}

impl Wallet {
    /// Signs a 32-byte digest as is. `v` is reported in the `27`/`28` notation.
    pub fn sign_hash(&self, hash: H256) -> Result<Signature, WalletError> {
        let (signature, recovery_id) = self.signer.sign_prehash_recoverable(hash.as_ref())?;
        let (r, s) = signature.split_bytes();

        Ok(Signature {
            r: U256::from_big_endian(r.as_slice()),
            s: U256::from_big_endian(s.as_slice()),
            v: recovery_id.to_byte() + 27,
        })
    }

    /// Signs the EIP-191 personal message digest of `message`
    pub fn sign_message<S: AsRef<[u8]>>(&self, message: S) -> Result<Signature, WalletError> {
        self.sign_hash(hash_message(message))
    }

    /// Signs the EIP-712 digest of `payload`, encoded with the given `version` rules
    pub fn sign_typed_data(
        &self,
        payload: &TypedData,
        version: TypedDataVersion,
    ) -> Result<Signature, WalletError> {
        let digest = payload.encode_eip712(version)?;
        self.sign_hash(H256(digest))
    }

    /// Signs a version 1 typed-data document
    pub fn sign_legacy_typed_data(
        &self,
        payload: &LegacyTypedData,
    ) -> Result<Signature, WalletError> {
        self.sign_hash(payload.hash()?)
    }

    /// Gets the wallet's signer
    pub fn signer(&self) -> &SigningKey {
        &self.signer
    }

    /// Returns the wallet's address
    pub fn address(&self) -> Address {
        self.address
    }
}

// do not log the signer
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodian_core::{types::RecoveryMessage, utils::keccak256};
    use serde_json::json;

    fn wallet() -> Wallet {
        "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse().unwrap()
    }

    #[test]
    fn signs_msg() {
        let message = "Some data";
        let wallet = wallet();

        let signature = wallet.sign_message(message).unwrap();
        // deterministic (RFC 6979) signature of the web3.js accounts example
        assert_eq!(
            signature.to_string(),
            "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c"
        );
        signature.verify(message, wallet.address).unwrap();
    }

    #[test]
    fn signs_hash_without_prefix() {
        let wallet = wallet();
        let hash = H256(keccak256("raw"));
        let signature = wallet.sign_hash(hash).unwrap();
        assert!(signature.v == 27 || signature.v == 28);
        assert_eq!(signature.recover(RecoveryMessage::Hash(hash)).unwrap(), wallet.address);
        // the personal message digest of the same bytes is a different message
        assert_ne!(signature.recover("raw").ok(), Some(wallet.address));
    }

    #[test]
    fn signs_typed_data() {
        let typed = TypedData::parse(&json!({
            "types": {
                "EIP712Domain": [{ "name": "name", "type": "string" }],
                "Mail": [{ "name": "contents", "type": "string" }]
            },
            "primaryType": "Mail",
            "domain": { "name": "Ether Mail" },
            "message": { "contents": "Hello, Bob!" }
        }))
        .unwrap();
        let wallet = wallet();

        let signature = wallet.sign_typed_data(&typed, TypedDataVersion::V4).unwrap();
        let digest = H256(typed.encode_eip712(TypedDataVersion::V4).unwrap());
        signature.verify(RecoveryMessage::Hash(digest), wallet.address).unwrap();
    }

    #[test]
    fn signs_legacy_typed_data() {
        let typed = LegacyTypedData::parse(&json!([
            { "type": "string", "name": "message", "value": "Hi, Alice!" }
        ]))
        .unwrap();
        let wallet = wallet();

        let signature = wallet.sign_legacy_typed_data(&typed).unwrap();
        signature.verify(RecoveryMessage::Hash(typed.hash().unwrap()), wallet.address).unwrap();
    }

    #[test]
    fn debug_omits_the_key() {
        let debug = format!("{:?}", wallet());
        assert!(debug.contains("address"));
        assert!(!debug.contains("signer"));
    }
}
