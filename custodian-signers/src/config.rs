use serde::{Deserialize, Serialize};

/// Tunables of the [`SigningDispatcher`](crate::SigningDispatcher).
///
/// ```
/// use custodian_signers::SignerConfig;
///
/// let config = SignerConfig::from_json_str(r#"{ "proxyFallbackChainId": 100 }"#).unwrap();
/// assert!(config.trezor_metamask_v4_compat);
/// assert_eq!(config.proxy_fallback_chain_id, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignerConfig {
    /// Sent to the Trezor firmware with typed data; makes it apply the V4 encoding rules
    pub trezor_metamask_v4_compat: bool,
    /// Chain id for the smart-contract proxy envelope when the signed document's domain has none
    pub proxy_fallback_chain_id: Option<u64>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self { trezor_metamask_v4_compat: true, proxy_fallback_chain_id: None }
    }
}

impl SignerConfig {
    pub fn from_json_str(config: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(config)
    }
}
