/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns true when `expires_unix` is present and no longer in the future.
pub fn is_expired_unix(expires_unix: Option<u64>, now_unix: u64) -> bool {
    matches!(expires_unix, Some(value) if value <= now_unix)
}

/// Truncated exponential backoff delay for attempt `attempt` (1-indexed).
pub fn backoff_delay_ms(base_delay_ms: u64, multiplier: f64, max_delay_ms: u64, attempt: u32) -> u64 {
    if attempt == 0 {
        return 0;
    }
    let exponent = (attempt - 1) as i32;
    let scaled = (base_delay_ms as f64) * multiplier.powi(exponent);
    if !scaled.is_finite() || scaled < 0.0 {
        return max_delay_ms;
    }
    (scaled as u64).min(max_delay_ms)
}
