use chrono::NaiveDate;

/// This is the standard way of converting a date to a record key in domainwatch.
pub fn date_to_record_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM-DD` record key back into a date. Anything else is not a key.
pub fn parse_record_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Formats a tick count as a readable duration, e.g. "2 hrs 5 min 3 sec".
pub fn ticks_to_string(ticks: u64) -> String {
    let hours = ticks / 3600;
    let minutes = ticks % 3600 / 60;
    let seconds = ticks % 60;
    let mut out = String::new();
    if hours > 0 {
        out += &format!("{hours} hrs ");
    }
    if minutes > 0 {
        out += &format!("{minutes} min ");
    }
    if seconds > 0 {
        out += &format!("{seconds} sec ");
    }
    if out.is_empty() {
        out += "0 sec ";
    }
    out.trim_end().to_string()
}

/// Compressed form used for the badge-style running total: the single largest unit only.
pub fn ticks_to_badge(ticks: u64) -> String {
    if ticks >= 3600 {
        format!("{}h", ticks / 3600)
    } else if ticks >= 60 {
        format!("{}m", ticks / 60)
    } else {
        format!("{ticks}s")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn record_key_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let key = date_to_record_key(date);
        assert_eq!(key, "2024-03-07");
        assert_eq!(parse_record_key(&key), Some(date));
        assert_eq!(parse_record_key("2024-3-7x"), None);
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(ticks_to_string(0), "0 sec");
        assert_eq!(ticks_to_string(3723), "1 hrs 2 min 3 sec");
        assert_eq!(ticks_to_string(120), "2 min");
        assert_eq!(ticks_to_badge(0), "0s");
        assert_eq!(ticks_to_badge(59), "59s");
        assert_eq!(ticks_to_badge(61), "1m");
        assert_eq!(ticks_to_badge(7300), "2h");
    }
}
