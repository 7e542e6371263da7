//! Ethereum data types used by the signing stack.
pub use ethabi::ethereum_types::{Address, H160, H256, U256};

mod signature;
pub use signature::{RawSignature, RecoveryMessage, Signature, SignatureError};

mod primitive;

pub mod eip712;
pub use eip712::{EIP712Domain, Eip712Error, TypedData, TypedDataHashes, TypedDataVersion};

mod legacy;
pub use legacy::{LegacyEntry, LegacyTypedData};
