mod hash;
pub use hash::{hash_message, keccak256, keccak256_concat, PERSONAL_MESSAGE_PREFIX};

use crate::types::Address;
use k256::{
    ecdsa::{SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
    PublicKey,
};

/// Converts a K256 verifying key to an Ethereum address: the last 20 bytes of the Keccak-256
/// hash of the uncompressed public key without its `0x04` tag.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = PublicKey::from(key).to_encoded_point(/* compress = */ false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Converts a K256 signing key to the Ethereum address it controls
pub fn secret_key_to_address(secret_key: &SigningKey) -> Address {
    public_key_to_address(secret_key.verifying_key())
}

/// Renders an address with its [EIP-55] mixed-case checksum.
///
/// [EIP-55]: https://eips.ethereum.org/EIPS/eip-55
pub fn to_checksum(addr: &Address) -> String {
    let lower = hex::encode(addr);
    let hash = hex::encode(keccak256(lower.as_bytes()));

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in lower.chars().zip(hash.chars()) {
        if h >= '8' {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(last: u8) -> SigningKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        SigningKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn derives_addresses_from_keys() {
        for (last, expected) in [
            (1, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
            (2, "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF"),
            (3, "0x6813Eb9362372EEF6200f3b1dbC3f819671cBA69"),
        ] {
            assert_eq!(to_checksum(&secret_key_to_address(&key(last))), expected);
        }
    }

    #[test]
    fn checksums_addresses() {
        // https://eips.ethereum.org/EIPS/eip-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr: Address = expected[2..].parse().unwrap();
            assert_eq!(to_checksum(&addr), expected);
        }
    }
}
