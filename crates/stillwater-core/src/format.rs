//! Small display formatters.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

/// 12-hour clock time, e.g. `9:05 AM`.
pub fn format_clock_time(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

/// Minutes and seconds, e.g. `2:05`. Used by countdowns.
pub fn format_mm_ss(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Short human duration: `1h 5m`, `45m`, `30s`.
pub fn format_compact_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    if hours > 0 {
        if minutes > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{hours}h")
        }
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

/// `Today`, `Yesterday`, or the weekday name for anything older.
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => date.format("%A").to_string(),
    }
}

/// Three-letter weekday for chart axes.
pub fn short_weekday(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time() {
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_clock_time(t), "9:05 AM");
        let t = NaiveTime::from_hms_opt(0, 30, 0).unwrap();
        assert_eq!(format_clock_time(t), "12:30 AM");
        let t = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
        assert_eq!(format_clock_time(t), "1:00 PM");
    }

    #[test]
    fn mm_ss() {
        assert_eq!(format_mm_ss(0), "0:00");
        assert_eq!(format_mm_ss(125), "2:05");
        assert_eq!(format_mm_ss(3600), "60:00");
    }

    #[test]
    fn compact_duration() {
        assert_eq!(format_compact_duration(Duration::seconds(30)), "30s");
        assert_eq!(format_compact_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_compact_duration(Duration::minutes(65)), "1h 5m");
        assert_eq!(format_compact_duration(Duration::hours(2)), "2h");
        assert_eq!(format_compact_duration(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(); // Saturday
        assert_eq!(relative_day_label(today, today), "Today");
        assert_eq!(relative_day_label(today.pred_opt().unwrap(), today), "Yesterday");
        let older = NaiveDate::from_ymd_opt(2024, 7, 17).unwrap();
        assert_eq!(relative_day_label(older, today), "Wednesday");
        assert_eq!(short_weekday(today), "Sat");
    }
}
