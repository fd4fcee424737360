use std::time::Duration;

/// Parse interval string like "30m", "1h", "90s" into Duration.
/// `"off"`, an empty string and zero disable auto-rotation.
pub fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("off") {
        return None;
    }

    let (num_str, suffix) = if let Some(num) = s.strip_suffix('s') {
        (num, 's')
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 'm')
    } else if let Some(num) = s.strip_suffix('h') {
        (num, 'h')
    } else {
        // default to seconds if no suffix
        (s, 's')
    };

    let num: u64 = num_str.parse().ok()?;
    let secs = match suffix {
        's' => num,
        'm' => num.checked_mul(60)?,
        'h' => num.checked_mul(3600)?,
        _ => return None,
    };

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_interval("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_interval("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_interval("60"), Some(Duration::from_secs(60)));
        assert_eq!(parse_interval(" 5m "), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_parse_interval_disabled() {
        assert_eq!(parse_interval(""), None);
        assert_eq!(parse_interval("off"), None);
        assert_eq!(parse_interval("OFF"), None);
        assert_eq!(parse_interval("0m"), None);
        assert_eq!(parse_interval("abc"), None);
        assert_eq!(parse_interval("m"), None);
    }
}
