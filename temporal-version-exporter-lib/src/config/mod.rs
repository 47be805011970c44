mod cli;
mod duration;
mod loader;
mod types;

pub use cli::{
    Cli, DEFAULT_LISTEN_ADDR, DEFAULT_PROBE_TIMEOUT, DEFAULT_SCRAPE_INTERVAL, DEFAULT_TEMPORAL_ADDR,
};
pub use duration::parse_duration;
pub use loader::{duration_or_default, parse_listen_addr};
pub use types::Config;
