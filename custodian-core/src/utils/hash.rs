//! Keccak-256 and EIP-191 message hashing.

use crate::types::H256;
use tiny_keccak::{Hasher, Keccak};

/// Prefix of an EIP-191 version `0x45` ("personal") message
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message according to [EIP-191] (version `0x45`).
///
/// The hashed payload is `"\x19Ethereum Signed Message:\n" + len(message) + message`, where the
/// length is written in decimal.
///
/// [EIP-191]: https://eips.ethereum.org/EIPS/eip-191
pub fn hash_message<T: AsRef<[u8]>>(message: T) -> H256 {
    let message = message.as_ref();
    let len = message.len().to_string();

    let mut payload =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + len.len() + message.len());
    payload.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    payload.extend_from_slice(len.as_bytes());
    payload.extend_from_slice(message);

    H256(keccak256(&payload))
}

/// Compute the Keccak-256 hash of input bytes.
pub fn keccak256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    keccak256_concat([bytes])
}

/// Keccak-256 over the concatenation of `parts`, without an intermediate buffer.
pub fn keccak256_concat<I, T>(parts: I) -> [u8; 32]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize(&mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // from https://emn178.github.io/online-tools/keccak_256.html
    fn test_keccak256() {
        assert_eq!(
            hex::encode(keccak256(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
        assert_eq!(keccak256_concat([&b"hel"[..], b"lo"]), keccak256("hello"));
    }

    // https://web3js.readthedocs.io/en/v1.2.2/web3-eth-accounts.html#hashmessage
    #[test]
    fn test_hash_message() {
        assert_eq!(
            hex::encode(hash_message("Hello World")),
            "a1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
        );
    }
}
