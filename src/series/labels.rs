// Human-formatted time labels for chart axes.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Timezone labels are rendered in. Rows always arrive in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelTimezone {
    #[default]
    Local,
    Utc,
}

impl LabelTimezone {
    /// Formats `ts` with a chrono format string in this timezone.
    pub fn format(&self, ts: &DateTime<Utc>, fmt: &str) -> String {
        match self {
            LabelTimezone::Local => ts.with_timezone(&chrono::Local).format(fmt).to_string(),
            LabelTimezone::Utc => ts.format(fmt).to_string(),
        }
    }

    fn day_of_month(&self, ts: &DateTime<Utc>) -> u32 {
        match self {
            LabelTimezone::Local => ts.with_timezone(&chrono::Local).day(),
            LabelTimezone::Utc => ts.day(),
        }
    }
}

/// Day of month with an English ordinal suffix: "1st", "2nd", "11th", "23rd".
pub fn ordinal_day_label(ts: &DateTime<Utc>, tz: LabelTimezone) -> String {
    let day = tz.day_of_month(ts);
    format!("{}{}", day, ordinal_suffix(day))
}

/// Hour (not padded) and minute (padded): "9:05", "14:30".
pub fn time_of_day_label(ts: &DateTime<Utc>, tz: LabelTimezone) -> String {
    tz.format(ts, "%-H:%M")
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    }
}
