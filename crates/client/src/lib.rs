mod client;
mod parser;
mod types;

pub use client::{USAGE_EVENTS_PATH, UsageClient};
pub use parser::parse_events_json;
pub use types::{ClientConfig, ClientError, Result, UsageEventsResponse};
