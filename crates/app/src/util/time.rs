use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

pub fn parse_rfc3339_utc(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())
        .map_err(|err| AppError::InvalidInput(format!("invalid datetime: {}", err)))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_offsets_to_utc() {
        let parsed = parse_rfc3339_utc("2025-03-01T02:00:00+02:00").expect("parse");
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_rfc3339_utc("yesterday").expect_err("invalid");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
