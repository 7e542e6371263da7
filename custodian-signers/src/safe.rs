//! Safe smart-contract wallets.
//!
//! A Safe does not hold a key. It accepts a signature from its owner over a `SafeMessage`
//! envelope that commits to the digest of the original message, bound to the Safe's address
//! and chain.
use crate::{
    custody::{CustodyError, KeyCustody},
    error::SignError,
};
use custodian_core::types::{
    eip712::{Eip712DomainType, Types, EIP712_DOMAIN},
    Address, EIP712Domain, TypedData, TypedDataVersion, U256,
};
use serde_json::{Map, Value};

/// Primary type of the envelope
pub const SAFE_MESSAGE: &str = "SafeMessage";

/// A Safe and the custody of its owner key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCustody {
    address: Address,
    owner: Box<KeyCustody>,
}

impl ProxyCustody {
    /// Fails when `owner` is itself a proxy
    pub fn new(address: Address, owner: KeyCustody) -> Result<Self, CustodyError> {
        if let KeyCustody::SmartContractProxy(_) = owner {
            return Err(CustodyError::NestedProxy)
        }
        Ok(Self { address, owner: Box::new(owner) })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> &KeyCustody {
        &self.owner
    }

    /// Wraps `inner` into the envelope the owner signs. The chain comes from the inner
    /// domain, else from `fallback_chain_id`.
    pub fn envelope(
        &self,
        inner: &TypedData,
        version: TypedDataVersion,
        fallback_chain_id: Option<u64>,
    ) -> Result<TypedData, SignError> {
        let digest = inner.encode_eip712(version)?;
        let chain_id = inner
            .domain
            .chain_id
            .or_else(|| fallback_chain_id.map(U256::from))
            .ok_or(SignError::MissingChainId)?;

        let mut types = Types::new();
        types.insert(
            EIP712_DOMAIN.to_string(),
            vec![
                Eip712DomainType::new("chainId", "uint256"),
                Eip712DomainType::new("verifyingContract", "address"),
            ],
        );
        types.insert(SAFE_MESSAGE.to_string(), vec![Eip712DomainType::new("message", "bytes")]);

        let mut message = Map::new();
        message.insert("message".to_string(), Value::String(format!("0x{}", hex::encode(digest))));

        Ok(TypedData {
            domain: EIP712Domain {
                chain_id: Some(chain_id),
                verifying_contract: Some(self.address),
                ..Default::default()
            },
            types,
            primary_type: SAFE_MESSAGE.to_string(),
            message,
        })
    }
}
