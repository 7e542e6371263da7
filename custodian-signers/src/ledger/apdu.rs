//! A [`LedgerTransport`] speaking APDU over USB HID.
use super::{types::*, LedgerHandle, LedgerTransport};
use crate::hardware::{DeviceError, DeviceHandle};

use async_trait::async_trait;
use coins_ledger::{
    common::{APDUCommand, APDUData},
    transports::{Ledger, LedgerAsync},
};
use custodian_core::types::RawSignature;
use futures_executor::block_on;
use serde_json::json;

/// Derivation paths the Ethereum app accepts are at most this deep
const MAX_PATH_DEPTH: usize = 10;

/// Connects to the first Ledger found on the USB bus
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerApdu;

#[async_trait]
impl LedgerTransport for LedgerApdu {
    async fn open(&self) -> Result<Box<dyn LedgerHandle>, LedgerError> {
        // HID futures are not `Send`, `#[async_trait]` futures must be. The device calls are
        // synchronous underneath, so `exchange` below is driven the same way.
        let transport = block_on(Ledger::init())?;
        Ok(Box::new(ApduHandle { transport }))
    }
}

struct ApduHandle {
    transport: Ledger,
}

impl DeviceHandle for ApduHandle {
    // the HID device is released when the handle is dropped right after
    fn close(&mut self) {}
}

#[async_trait]
impl LedgerHandle for ApduHandle {
    async fn sign_personal_message(
        &mut self,
        path: &str,
        message_hex: &str,
    ) -> Result<RawSignature, LedgerError> {
        let message = hex::decode(message_hex)?;

        let mut payload = path_to_bytes(path)?;
        payload.extend_from_slice(&(message.len() as u32).to_be_bytes());
        payload.extend_from_slice(&message);

        self.sign_payload(INS::SIGN_PERSONAL_MESSAGE, payload)
    }

    async fn sign_typed_data_hash(
        &mut self,
        path: &str,
        domain_separator_hex: &str,
        struct_hash_hex: &str,
    ) -> Result<RawSignature, LedgerError> {
        let mut payload = path_to_bytes(path)?;
        payload.extend_from_slice(&hex::decode(domain_separator_hex)?);
        payload.extend_from_slice(&hex::decode(struct_hash_hex)?);

        self.sign_payload(INS::SIGN_ETH_EIP_712, payload)
    }
}

impl ApduHandle {
    // Helper function for signing either personal messages or typed data hashes
    fn sign_payload(&self, command: INS, mut payload: Vec<u8>) -> Result<RawSignature, LedgerError> {
        if payload.is_empty() {
            return Err(LedgerError::EmptyPayload)
        }
        let mut command = APDUCommand {
            ins: command as u8,
            p1: P1_FIRST,
            p2: P2::NO_CHAINCODE as u8,
            data: APDUData::new(&[]),
            response_len: None,
        };

        let mut result = Vec::new();

        // Iterate in 255 byte chunks
        while !payload.is_empty() {
            let chunk_size = std::cmp::min(payload.len(), 255);
            let data = payload.drain(0..chunk_size).collect::<Vec<_>>();
            command.data = APDUData::new(&data);

            let answer = block_on(self.transport.exchange(&command))?;
            let status = answer.retcode();
            if status != SW_OK {
                return Err(DeviceError::new(json!({ "statusCode": status })).into())
            }
            result = answer.data().ok_or(LedgerError::UnexpectedNullResponse)?.to_vec();

            // We need more data
            command.p1 = P1::MORE as u8;
        }

        if result.len() < 65 {
            return Err(LedgerError::ShortResponse { got: result.len(), at_least: 65 })
        }
        Ok(RawSignature {
            v: result[0] as u64,
            r: hex::encode(&result[1..33]),
            s: hex::encode(&result[33..65]),
        })
    }
}

// helper which converts a derivation path to bytes
fn path_to_bytes(path: &str) -> Result<Vec<u8>, LedgerError> {
    let invalid = || LedgerError::InvalidPath(path.to_string());
    let elements = path.split('/').skip(1).collect::<Vec<_>>();
    let depth = elements.len();
    if depth == 0 || depth > MAX_PATH_DEPTH {
        return Err(invalid())
    }

    let mut bytes = vec![depth as u8];
    for derivation_index in elements {
        let (digits, hardened) = match derivation_index.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (derivation_index, false),
        };
        let mut index = digits.parse::<u32>().map_err(|_| invalid())?;
        if index & 0x80000000 != 0 {
            return Err(invalid())
        }
        if hardened {
            index |= 0x80000000;
        }

        bytes.extend(&index.to_be_bytes());
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_paths() {
        let bytes = path_to_bytes(&DerivationType::LedgerLive(1).to_string()).unwrap();
        assert_eq!(
            bytes,
            [
                vec![5],
                0x8000002cu32.to_be_bytes().to_vec(),
                0x8000003cu32.to_be_bytes().to_vec(),
                0x80000001u32.to_be_bytes().to_vec(),
                0u32.to_be_bytes().to_vec(),
                0u32.to_be_bytes().to_vec(),
            ]
            .concat()
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in ["m", "m/44'/x", "m/44''", "m/4294967295", "m/1/2/3/4/5/6/7/8/9/10/11"] {
            assert!(matches!(path_to_bytes(path), Err(LedgerError::InvalidPath(_))), "{path}");
        }
    }

    #[tokio::test]
    #[ignore]
    async fn signs_on_a_real_device() {
        let ledger = crate::LedgerSigner::new(LedgerApdu);
        let signature = ledger
            .sign_message(&DerivationType::LedgerLive(0), b"hello world")
            .await
            .unwrap();
        assert_eq!(signature.to_string().len(), 132);
    }
}
