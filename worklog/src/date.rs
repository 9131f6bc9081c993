use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The fixed format Jira uses for the `started` field of a worklog:
/// `2024-01-10T09:00:00.000+0300`
pub const JIRA_STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Midnight of the current date in `tz`.
///
/// This is the lower bound for both the update query and the aggregation
/// inclusion test. Recomputed on every run, never cached across days.
#[must_use]
pub fn start_of_day(tz: Tz) -> DateTime<Tz> {
    start_of_day_on(Utc::now().with_timezone(&tz).date_naive(), tz)
}

#[must_use]
pub fn start_of_day_on(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    // Midnight may not exist on a DST transition day; settle for the
    // earliest valid instant of that date.
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Parses a worklog `started` timestamp.
///
/// Returns `None` when the string does not match the fixed Jira format. The
/// caller excludes such records from aggregation instead of failing the run.
#[must_use]
pub fn parse_started(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, JIRA_STARTED_FORMAT).ok()
}
