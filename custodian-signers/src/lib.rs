#![cfg_attr(docsrs, feature(doc_cfg))]
//! Signs personal messages and typed data with whichever custody holds an account's key.
//!
//! Supported custodies:
//! - BIP-39 secret phrase
//! - Private key
//! - Ledger (hashes computed locally, optional USB transport behind the `ledger` feature)
//! - Trezor, through a bridge transport
//! - Safe smart-contract wallets, signed by their owner
//!
//! ```no_run
//! use custodian_signers::{KeyCustody, PrivateKey, SignRequest, SigningDispatcher};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = SigningDispatcher::builder().build();
//! let custody = KeyCustody::LocalPrivateKey(PrivateKey::new(
//!     "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7",
//! ));
//!
//! let request = SignRequest::PersonalSign { message: b"hello world".to_vec() };
//! let signature = dispatcher.sign(&request, &custody).await?;
//! println!("{signature}");
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{MnemonicBuilder, MnemonicBuilderError, Wallet, WalletError};

pub mod hardware;

pub mod ledger;
#[cfg(feature = "ledger")]
#[cfg_attr(docsrs, doc(cfg(feature = "ledger")))]
pub use ledger::apdu::LedgerApdu;
pub use ledger::{
    app::LedgerSigner,
    types::{DerivationType as LedgerPath, LedgerError},
    LedgerHandle, LedgerTransport,
};

pub mod trezor;
pub use trezor::{
    app::TrezorSigner,
    types::{DerivationType as TrezorPath, TrezorError},
    TrezorHandle, TrezorTransport,
};

pub mod safe;
pub use safe::ProxyCustody;

mod custody;
pub use custody::{CustodyError, KeyCustody, PrivateKey, SecretPhrase};

pub mod request;
pub use request::{RequestError, SignRequest};

mod config;
pub use config::SignerConfig;

mod error;
pub use error::SignError;

mod dispatcher;
pub use dispatcher::{SigningDispatcher, SigningDispatcherBuilder};

/// Re-export the BIP-39 wordlists
pub use coins_bip39;
