use crate::{
    types::{Address, H256, U256},
    utils::{hash_message, public_key_to_address},
};
use k256::ecdsa::{
    Error as K256SignatureError, RecoveryId, Signature as K256Signature, VerifyingKey,
};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use thiserror::Error;

/// An error involving a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Invalid length, secp256k1 signatures are 65 bytes
    #[error("invalid signature length, got {0}, expected 65")]
    InvalidLength(usize),
    /// When parsing a signature from string to hex
    #[error(transparent)]
    DecodingError(#[from] hex::FromHexError),
    /// A device returned an `r` or `s` component that is not a hex word
    #[error("invalid `{name}` component: {value:?}")]
    InvalidComponent { name: &'static str, value: String },
    /// A device returned a `v` that does not fit a byte
    #[error("invalid recovery value {0}")]
    InvalidV(u64),
    /// Thrown when signature verification failed (i.e. when the address that
    /// produced the signature did not match the expected address)
    #[error("Signature verification failed. Expected {0:?}, got {1:?}")]
    VerificationError(Address, Address),
    /// Internal error during signature recovery
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
    /// Error in recovering public key from signature
    #[error("Public key recovery error")]
    RecoveryError,
}

/// Recovery message data.
///
/// The message data can either be a binary message that is first hashed
/// according to EIP-191 and then recovered based on the signature or a
/// precomputed hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryMessage {
    /// Message bytes
    Data(Vec<u8>),
    /// Message hash
    Hash(H256),
}

/// Signature parts as reported by a hardware device: `v` as a small integer, `r` and `s` as
/// hex strings that may lack the `0x` prefix and leading zeros.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub v: u64,
    pub r: String,
    pub s: String,
}

/// An ECDSA signature in its canonical `r ‖ s ‖ v` form.
///
/// Displays as `0x` followed by 130 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub struct Signature {
    /// R value
    pub r: U256,
    /// S Value
    pub s: U256,
    /// V value
    pub v: u8,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = <[u8; 65]>::from(self);
        write!(f, "0x{}", hex::encode(&sig[..]))
    }
}

impl Signature {
    /// Normalizes the parts reported by a device into a canonical signature.
    pub fn from_raw(raw: &RawSignature) -> Result<Self, SignatureError> {
        let v = u8::try_from(raw.v).map_err(|_| SignatureError::InvalidV(raw.v))?;
        Ok(Self { r: parse_component("r", &raw.r)?, s: parse_component("s", &raw.s)?, v })
    }

    /// Verifies that signature on `message` was produced by `address`
    pub fn verify<M, A>(&self, message: M, address: A) -> Result<(), SignatureError>
    where
        M: Into<RecoveryMessage>,
        A: Into<Address>,
    {
        let address = address.into();
        let recovered = self.recover(message)?;
        if recovered != address {
            return Err(SignatureError::VerificationError(address, recovered))
        }

        Ok(())
    }

    /// Recovers the Ethereum address which was used to sign the given message.
    ///
    /// `v` may be given as `0`/`1` or in 'Electrum' notation (`27`/`28`).
    pub fn recover<M>(&self, message: M) -> Result<Address, SignatureError>
    where
        M: Into<RecoveryMessage>,
    {
        let message_hash = match message.into() {
            RecoveryMessage::Data(ref message) => hash_message(message),
            RecoveryMessage::Hash(hash) => hash,
        };

        let (signature, recovery_id) = self.as_signature()?;
        let verifying_key =
            VerifyingKey::recover_from_prehash(message_hash.as_ref(), &signature, recovery_id)?;
        Ok(public_key_to_address(&verifying_key))
    }

    fn as_signature(&self) -> Result<(K256Signature, RecoveryId), SignatureError> {
        let recovery_id = self.recovery_id()?;
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        self.r.to_big_endian(&mut r_bytes);
        self.s.to_big_endian(&mut s_bytes);
        let signature = K256Signature::from_scalars(
            *k256::FieldBytes::from_slice(&r_bytes),
            *k256::FieldBytes::from_slice(&s_bytes),
        )?;
        Ok((signature, recovery_id))
    }

    /// Retrieve the recovery ID.
    pub fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let standard_v = match self.v {
            0 | 27 => 0,
            1 | 28 => 1,
            _ => return Err(SignatureError::RecoveryError),
        };
        RecoveryId::from_byte(standard_v).ok_or(SignatureError::RecoveryError)
    }

    /// Copies and serializes `self` into a new `Vec` with the recovery id included
    #[allow(clippy::wrong_self_convention)]
    pub fn to_vec(&self) -> Vec<u8> {
        <[u8; 65]>::from(self).to_vec()
    }
}

/// Parses one 32-byte component, left-padding short values with zeros.
fn parse_component(name: &'static str, value: &str) -> Result<U256, SignatureError> {
    let invalid = || SignatureError::InvalidComponent { name, value: value.to_string() };
    let hex = value.strip_prefix("0x").unwrap_or(value);
    if hex.is_empty() || hex.len() > 64 {
        return Err(invalid())
    }
    let padded = format!("{hex:0>64}");
    let bytes = hex::decode(padded).map_err(|_| invalid())?;
    Ok(U256::from_big_endian(&bytes))
}

impl<'a> TryFrom<&'a [u8]> for Signature {
    type Error = SignatureError;

    /// Parses a raw signature which is expected to be 65 bytes long where
    /// the first 32 bytes is the `r` value, the second 32 bytes the `s` value
    /// and the final byte is the `v` value.
    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 65 {
            return Err(SignatureError::InvalidLength(bytes.len()))
        }

        let r = U256::from_big_endian(&bytes[0..32]);
        let s = U256::from_big_endian(&bytes[32..64]);
        Ok(Signature { r, s, v: bytes[64] })
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Signature::try_from(&bytes[..])
    }
}

impl From<&Signature> for [u8; 65] {
    fn from(src: &Signature) -> [u8; 65] {
        let mut sig = [0u8; 65];
        src.r.to_big_endian(&mut sig[..32]);
        src.s.to_big_endian(&mut sig[32..64]);
        sig[64] = src.v;
        sig
    }
}

impl From<Signature> for [u8; 65] {
    fn from(src: Signature) -> [u8; 65] {
        <[u8; 65]>::from(&src)
    }
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<&[u8]> for RecoveryMessage {
    fn from(s: &[u8]) -> Self {
        s.to_owned().into()
    }
}

impl From<Vec<u8>> for RecoveryMessage {
    fn from(s: Vec<u8>) -> Self {
        RecoveryMessage::Data(s)
    }
}

impl From<&str> for RecoveryMessage {
    fn from(s: &str) -> Self {
        s.as_bytes().to_owned().into()
    }
}

impl From<String> for RecoveryMessage {
    fn from(s: String) -> Self {
        RecoveryMessage::Data(s.into_bytes())
    }
}

impl From<[u8; 32]> for RecoveryMessage {
    fn from(hash: [u8; 32]) -> Self {
        H256(hash).into()
    }
}

impl From<H256> for RecoveryMessage {
    fn from(hash: H256) -> Self {
        RecoveryMessage::Hash(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_web3_signature() {
        // test vector taken from:
        // https://web3js.readthedocs.io/en/v1.2.2/web3-eth-accounts.html#sign
        let signature = Signature::from_str(
            "b91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c"
        ).expect("could not parse signature");
        assert_eq!(
            signature.recover("Some data").unwrap(),
            Address::from_str("2c7536E3605D9C16a7a3D7b1898e529396a65c23").unwrap()
        );
    }

    #[test]
    fn signature_from_str() {
        let s1 = Signature::from_str(
            "0xaa231fbe0ed2b5418e6ba7c19bee2522852955ec50996c02a2fe3e71d30ddaf1645baf4823fea7cb4fcc7150842493847cfb6a6d63ab93e8ee928ee3f61f503500"
        ).expect("could not parse 0x-prefixed signature");

        let s2 = Signature::from_str(
            "aa231fbe0ed2b5418e6ba7c19bee2522852955ec50996c02a2fe3e71d30ddaf1645baf4823fea7cb4fcc7150842493847cfb6a6d63ab93e8ee928ee3f61f503500"
        ).expect("could not parse non-prefixed signature");

        assert_eq!(s1, s2);
        assert!(matches!(Signature::from_str("0xabcd"), Err(SignatureError::InvalidLength(2))));
    }

    #[test]
    fn normalizes_device_output() {
        let raw = RawSignature { v: 27, r: "ab".repeat(32), s: "cd".repeat(32) };
        let sig = Signature::from_raw(&raw).unwrap().to_string();
        assert_eq!(sig.len(), 132);
        assert_eq!(sig, format!("0x{}{}1b", "ab".repeat(32), "cd".repeat(32)));
    }

    #[test]
    fn pads_short_components() {
        let raw = RawSignature { v: 28, r: "0x1".to_string(), s: "ff".to_string() };
        let sig = Signature::from_raw(&raw).unwrap();
        assert_eq!(sig.r, U256::one());
        assert_eq!(
            sig.to_string(),
            format!("0x{:0>64}{:0>64}1c", "1", "ff"),
        );
    }

    #[test]
    fn rejects_malformed_components() {
        let too_long = RawSignature { v: 27, r: "a".repeat(65), s: "00".to_string() };
        assert!(matches!(
            Signature::from_raw(&too_long),
            Err(SignatureError::InvalidComponent { name: "r", .. })
        ));
        let not_hex = RawSignature { v: 27, r: "00".to_string(), s: "zz".to_string() };
        assert!(matches!(
            Signature::from_raw(&not_hex),
            Err(SignatureError::InvalidComponent { name: "s", .. })
        ));
        let empty = RawSignature { v: 27, r: "0x".to_string(), s: "00".to_string() };
        assert!(Signature::from_raw(&empty).is_err());
        let big_v = RawSignature { v: 256, r: "00".to_string(), s: "00".to_string() };
        assert!(matches!(Signature::from_raw(&big_v), Err(SignatureError::InvalidV(256))));
    }

    #[test]
    fn serializes_as_canonical_string() {
        let raw = RawSignature { v: 27, r: "ab".repeat(32), s: "cd".repeat(32) };
        let sig = Signature::from_raw(&raw).unwrap();
        let json = serde_json::to_value(sig).unwrap();
        assert_eq!(json, serde_json::Value::String(sig.to_string()));
        assert_eq!(serde_json::from_value::<Signature>(json).unwrap(), sig);
    }
}
