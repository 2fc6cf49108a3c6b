//! Built-in handlers, selectable by name from the command line.

mod echo;
mod simple;


pub use echo::EchoHandler;
pub use simple::SimpleHandler;

use std::sync::Arc;
use telepoll_api::BotApi;
use telepoll_core::traits::Handler;

/// Names accepted by [`resolve`].
pub const KNOWN: &[&str] = &["simple", "echo"];

/// Build the handler registered under `name`.
pub fn resolve(name: &str, api: Arc<BotApi>) -> anyhow::Result<Arc<dyn Handler>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "simple" => Ok(Arc::new(SimpleHandler::new(api))),
        "echo" => Ok(Arc::new(EchoHandler::new(api))),
        other => anyhow::bail!(
            "unknown handler '{other}'. Known handlers: {}",
            KNOWN.join(", ")
        ),
    }
}
