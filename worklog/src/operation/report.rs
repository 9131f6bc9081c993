use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use jira::models::worklog::WorklogEntry;
use log::debug;

use crate::error::WorklogError;
use crate::types::{ObservedUsers, UserHours};
use crate::{date, ApplicationRuntime};

/// Seconds logged per email address within the current time window
pub type AggregateResult = BTreeMap<String, i64>;

/// Runs the aggregation pipeline: compute the day window, fetch the ids of
/// the worklogs updated since then, resolve them to full entries and reduce
/// them into per-user totals.
///
/// # Errors
/// Any transport or deserialization failure in either fetch aborts the run;
/// there is no partial aggregate.
pub async fn execute(runtime: &ApplicationRuntime) -> Result<AggregateResult, WorklogError> {
    let since = date::start_of_day(runtime.timezone());
    debug!("Aggregating worklogs since {since}");

    let ids = runtime
        .jira_client()
        .updated_worklog_ids(since.timestamp_millis())
        .await?;
    let entries = runtime.jira_client().worklog_details(&ids).await?;
    debug!("Resolved {} worklog entries", entries.len());

    Ok(aggregate(
        &entries,
        runtime.observed(),
        &since.fixed_offset(),
    ))
}

/// Reduces worklog entries into a per-email total of logged seconds.
///
/// Every observed email is present in the result, zero-seeded. Entries are
/// excluded when their `started` timestamp does not parse or falls strictly
/// before `since`; one starting exactly at `since` counts. Authors outside
/// the observed set still accumulate — filtering to observed-only happens at
/// the presentation boundary.
#[must_use]
pub fn aggregate(
    entries: &[WorklogEntry],
    observed: &ObservedUsers,
    since: &DateTime<FixedOffset>,
) -> AggregateResult {
    let mut totals: AggregateResult = observed.iter().map(|email| (email.clone(), 0)).collect();

    for entry in entries {
        let Some(started) = date::parse_started(&entry.started) else {
            debug!("Excluding worklog with unparseable start '{}'", entry.started);
            continue;
        };
        if started < *since {
            // Updated today, but logged on an earlier date
            continue;
        }
        let Some(email) = entry.author.emailAddress.as_deref() else {
            debug!("Excluding worklog by {} without email", entry.author.displayName);
            continue;
        };
        *totals.entry(email.to_string()).or_insert(0) += entry.timeSpentSeconds;
    }

    totals
}

/// Totals for the observed users only, in configuration order
#[must_use]
pub fn observed_totals(totals: &AggregateResult, observed: &ObservedUsers) -> Vec<UserHours> {
    observed
        .iter()
        .map(|email| UserHours {
            email: email.clone(),
            seconds: totals.get(email).copied().unwrap_or(0),
        })
        .collect()
}

/// The observed users whose whole logged hours are strictly below the
/// threshold, in configuration order. A user at exactly the threshold does
/// not qualify.
#[must_use]
pub fn below_threshold(
    totals: &AggregateResult,
    observed: &ObservedUsers,
    threshold_hours: i64,
) -> Vec<UserHours> {
    observed_totals(totals, observed)
        .into_iter()
        .filter(|user| user.seconds / 3600 < threshold_hours)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jira::models::core::Author;

    fn author(email: Option<&str>) -> Author {
        Author {
            accountId: "acc".to_string(),
            displayName: "Some One".to_string(),
            active: true,
            emailAddress: email.map(String::from),
        }
    }

    fn entry(email: &str, seconds: i64, started: &str) -> WorklogEntry {
        WorklogEntry {
            author: author(Some(email)),
            updateAuthor: author(Some(email)),
            timeSpent: String::new(),
            timeSpentSeconds: seconds,
            started: started.to_string(),
        }
    }

    fn since() -> DateTime<FixedOffset> {
        date::parse_started("2024-01-10T00:00:00.000+0300").unwrap()
    }

    #[test]
    fn empty_input_yields_zero_for_every_observed_user() {
        let observed = ObservedUsers::from_comma_separated("a@x.com,b@x.com");
        let totals = aggregate(&[], &observed, &since());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["a@x.com"], 0);
        assert_eq!(totals["b@x.com"], 0);
    }

    #[test]
    fn record_at_exactly_the_window_start_is_included() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        let entries = vec![entry("a@x.com", 600, "2024-01-10T00:00:00.000+0300")];
        let totals = aggregate(&entries, &observed, &since());
        assert_eq!(totals["a@x.com"], 600);
    }

    #[test]
    fn record_before_the_window_is_excluded() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        let entries = vec![entry("a@x.com", 600, "2024-01-09T23:59:59.999+0300")];
        let totals = aggregate(&entries, &observed, &since());
        assert_eq!(totals["a@x.com"], 0);
    }

    #[test]
    fn daily_totals_scenario() {
        let observed = ObservedUsers::from_comma_separated("a@x.com,b@x.com,c@x.com");
        let entries = vec![
            entry("a@x.com", 3600, "2024-01-10T09:00:00.000+0300"),
            // Updated today but logged yesterday evening, must not count
            entry("a@x.com", 1800, "2024-01-09T23:00:00.000+0300"),
            entry("b@x.com", 7200, "2024-01-10T10:00:00.000+0300"),
        ];
        let totals = aggregate(&entries, &observed, &since());
        assert_eq!(totals["a@x.com"], 3600);
        assert_eq!(totals["b@x.com"], 7200);
        assert_eq!(totals["c@x.com"], 0);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let observed = ObservedUsers::from_comma_separated("a@x.com,b@x.com");
        let mut entries = vec![
            entry("a@x.com", 3600, "2024-01-10T09:00:00.000+0300"),
            entry("b@x.com", 7200, "2024-01-10T10:00:00.000+0300"),
            entry("a@x.com", 900, "2024-01-10T15:00:00.000+0300"),
        ];
        let forward = aggregate(&entries, &observed, &since());
        entries.reverse();
        let backward = aggregate(&entries, &observed, &since());
        assert_eq!(forward, backward);
    }

    #[test]
    fn malformed_started_excludes_only_that_record() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        let entries = vec![
            entry("a@x.com", 3600, "not a timestamp"),
            entry("a@x.com", 1800, "2024-01-10T12:00:00.000+0300"),
        ];
        let totals = aggregate(&entries, &observed, &since());
        assert_eq!(totals["a@x.com"], 1800);
    }

    #[test]
    fn unobserved_author_still_accumulates() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        let entries = vec![entry("z@x.com", 3600, "2024-01-10T09:00:00.000+0300")];
        let totals = aggregate(&entries, &observed, &since());
        assert_eq!(totals["z@x.com"], 3600);
        assert_eq!(totals["a@x.com"], 0);
    }

    #[test]
    fn author_without_email_is_excluded() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        let mut anonymous = entry("a@x.com", 3600, "2024-01-10T09:00:00.000+0300");
        anonymous.author = author(None);
        let totals = aggregate(&[anonymous], &observed, &since());
        assert_eq!(totals["a@x.com"], 0);
        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn threshold_filter_is_strictly_below_whole_hours() {
        let observed = ObservedUsers::from_comma_separated("a@x.com,b@x.com,c@x.com");
        let totals = AggregateResult::from([
            ("a@x.com".to_string(), 3600),
            ("b@x.com".to_string(), 7200),
            ("c@x.com".to_string(), 0),
        ]);
        let lagging = below_threshold(&totals, &observed, 2);
        let emails: Vec<&str> = lagging.iter().map(|u| u.email.as_str()).collect();
        // b has exactly 2 whole hours and does not qualify
        assert_eq!(emails, ["a@x.com", "c@x.com"]);
    }

    #[test]
    fn threshold_uses_whole_hours_not_seconds() {
        let observed = ObservedUsers::from_comma_separated("a@x.com");
        // 1h59m is still "1 whole hour", below a threshold of 2
        let totals = AggregateResult::from([("a@x.com".to_string(), 7140)]);
        assert_eq!(below_threshold(&totals, &observed, 2).len(), 1);
        // 2h00m qualifies no longer
        let totals = AggregateResult::from([("a@x.com".to_string(), 7200)]);
        assert!(below_threshold(&totals, &observed, 2).is_empty());
    }

    #[test]
    fn observed_totals_filters_unobserved_and_keeps_order() {
        let observed = ObservedUsers::from_comma_separated("b@x.com,a@x.com");
        let totals = AggregateResult::from([
            ("a@x.com".to_string(), 100),
            ("z@x.com".to_string(), 999),
        ]);
        let listed = observed_totals(&totals, &observed);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].email, "b@x.com");
        assert_eq!(listed[0].seconds, 0);
        assert_eq!(listed[1].email, "a@x.com");
        assert_eq!(listed[1].seconds, 100);
    }
}
