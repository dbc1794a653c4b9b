pub mod assessments;
pub mod catalog;
pub mod community;
pub mod lessons;
pub mod media;
pub mod user;
pub mod vocabulary;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

pub(crate) fn format_naive_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
