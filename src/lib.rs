#![cfg_attr(docsrs, feature(doc_cfg))]
//! # custodian
//!
//! Signing of personal messages and EIP-712 typed data for Ethereum wallets whose keys live in
//! different places: a secret phrase or private key in memory, a Ledger or Trezor device, or
//! behind a Safe smart-contract wallet.
//!
//! ```no_run
//! use custodian::prelude::*;
//! use serde_json::json;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = SigningDispatcher::builder().build();
//! let custody = KeyCustody::LocalPrivateKey(PrivateKey::new(
//!     "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
//! ));
//!
//! let params = json!(["0x68656c6c6f", "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"]);
//! let (account, request) = SignRequest::from_rpc("personal_sign", &params)?;
//! let signature = dispatcher.sign(&request, &custody).await?;
//! signature.verify("hello", account)?;
//! # Ok(())
//! # }
//! ```

/// # custodian-core
///
/// Validation combinators for untrusted JSON, the JSON-RPC error classifier, EIP-712 and
/// legacy typed-data hashing, and the signature type.
pub mod core {
    pub use custodian_core::*;
}

/// # custodian-signers
///
/// Custody backends and the [`SigningDispatcher`](custodian_signers::SigningDispatcher) that
/// routes requests to them.
pub mod signers {
    pub use custodian_signers::*;
}

/// Easy imports of frequently used type definitions and traits
pub mod prelude {
    pub use super::core::{
        rpc::{Disposition, JsonRpcError, WireError},
        types::*,
        validation::{NoneSucceeded, ValidationError},
    };
    pub use super::signers::*;
}

