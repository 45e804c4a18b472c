mod polling;
mod provider;
mod server;

pub use polling::{
    PollingConfig, MAX_BACKOFF_FACTOR, MAX_POLL_INTERVAL_MS, MAX_POLL_TIMEOUT_SECS,
};
pub use provider::{ProviderConfig, DEFAULT_API_KEY_ENV, DEFAULT_PROVIDER_URL};
pub use server::ServerConfig;
