/// Compact count with `K`/`M` suffixes, e.g. `1.5M`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if value >= 1_000_000.0 {
        return format!("{:.*}M", decimals, value / 1_000_000.0);
    }
    if value >= 1_000.0 {
        return format!("{:.*}K", decimals, value / 1_000.0);
    }
    format!("{:.*}", decimals, value)
}

pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value.is_finite() => format!("${:.2}", value),
        _ => "$0.00".to_string(),
    }
}

pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{:.1}%", value),
        _ => "0.0%".to_string(),
    }
}
