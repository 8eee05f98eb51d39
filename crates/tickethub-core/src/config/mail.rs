//! Ticket e-mail delivery configuration.

use serde::{Deserialize, Serialize};

/// Mail delivery configuration.
///
/// Tickets are delivered through an HTTP mail API (Resend-compatible).
/// When `enabled` is false, issuance skips delivery entirely, which is the
/// default for development and test environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Whether ticket e-mails are sent at all.
    #[serde(default)]
    pub enabled: bool,
    /// Mail API endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Mail API bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default = "default_from")]
    pub from: String,
    /// Public base URL used to build ticket links in the message body.
    #[serde(default = "default_base_url")]
    pub public_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_api_url(),
            api_key: String::new(),
            from: default_from(),
            public_base_url: default_base_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from() -> String {
    "tickets@example.com".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
