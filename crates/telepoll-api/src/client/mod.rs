//! Telegram Bot API client.
//!
//! Every call is a JSON `POST` to `{base}/bot{token}/{method}`.
//! Docs: <https://core.telegram.org/bots/api>

mod methods;
mod params;
mod request;
mod transport;

#[cfg(test)]
mod tests;

pub use methods::{MessageTarget, MAX_MESSAGE_LEN};
pub use params::{ChatAction, ChatId, ParseMode, SendOptions};

/// Official API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Bot API client. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BotApi {
    client: reqwest::Client,
    /// `{base}/bot{token}`; method names are appended to this.
    method_url: String,
}

impl BotApi {
    /// Client for the official endpoint.
    pub fn new(token: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Client for a self-hosted Bot API server or a test double.
    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Reuse an already configured `reqwest::Client` (proxy, TLS settings...).
    pub fn with_client(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client,
            method_url: format!("{base}/bot{token}"),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.method_url)
    }
}

impl std::fmt::Debug for BotApi {
    // The URL embeds the bot token; keep it out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi").finish_non_exhaustive()
    }
}
