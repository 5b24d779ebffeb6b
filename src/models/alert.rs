//! Weather alert record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A weather alert decoded from the alert datastore feed.
///
/// Built whole by the alert decoder; a record boundary never yields a
/// half-filled alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alert {
    /// Dataset description, e.g. "大雨特報"
    pub description: String,

    /// Time the alert was issued (feed local time)
    pub issue_time: NaiveDateTime,

    /// Time the alert stops being valid (feed local time)
    pub end_time: NaiveDateTime,

    /// Alert body text, surrounding whitespace trimmed
    pub content: String,
}

impl Alert {
    /// Format alert for display using a template.
    ///
    /// Supported placeholders: `{description}`, `{issue_time}`, `{end_time}`, `{content}`.
    /// Times are rendered with `time_format` (chrono `strftime` syntax).
    pub fn format(&self, template: &str, time_format: &str) -> String {
        template
            .replace("{description}", &self.description)
            .replace(
                "{issue_time}",
                &self.issue_time.format(time_format).to_string(),
            )
            .replace("{end_time}", &self.end_time.format(time_format).to_string())
            .replace("{content}", &self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_alert() -> Alert {
        let day = NaiveDate::from_ymd_opt(2024, 7, 24).unwrap();
        Alert {
            description: "颱風".to_string(),
            issue_time: day.and_hms_opt(8, 30, 0).unwrap(),
            end_time: day.and_hms_opt(23, 0, 0).unwrap(),
            content: "中度颱風凱米".to_string(),
        }
    }

    #[test]
    fn test_format() {
        let alert = sample_alert();
        let result = alert.format("[{description}] {issue_time} ~ {end_time}", "%m/%d %H:%M");
        assert_eq!(result, "[颱風] 07/24 08:30 ~ 07/24 23:00");
    }
}
