use serde::Deserialize;
use usage_core::UsageEvent;

use crate::types::{Result, UsageEventsResponse};

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsDocument {
    Bare(Vec<UsageEvent>),
    Response(UsageEventsResponse),
}

/// Parses saved events: either a bare JSON array or a full API response body.
pub fn parse_events_json(data: &str) -> Result<Vec<UsageEvent>> {
    let document: EventsDocument = serde_json::from_str(data)?;
    Ok(match document {
        EventsDocument::Bare(events) => events,
        EventsDocument::Response(response) => response.usage_events_display,
    })
}
