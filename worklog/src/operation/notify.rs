use log::{debug, warn};
use slack::models::{Attachment, AttachmentField};

use crate::error::WorklogError;
use crate::operation::report;
use crate::ApplicationRuntime;

const PRETEXT: &str = "Time log notification";
const TEXT: &str = "Do not forget log time for today";
const COLOR: &str = "#FFC700";

/// Runs the aggregation pipeline and posts a reminder to the configured
/// Slack channel for every observed user strictly below the hour threshold.
///
/// Returns the number of users reminded; when everyone is at or above the
/// threshold nothing is posted and 0 is returned.
///
/// # Errors
/// Propagates pipeline failures and Slack posting failures. A failed
/// user-by-email lookup only degrades that line to the bare email address.
pub async fn execute(runtime: &ApplicationRuntime) -> Result<usize, WorklogError> {
    let totals = report::execute(runtime).await?;
    let lagging = report::below_threshold(
        &totals,
        runtime.observed(),
        runtime.config().tracking.threshold_hours,
    );
    if lagging.is_empty() {
        debug!("Everyone is at or above the threshold, not posting");
        return Ok(0);
    }

    let mut attachment = Attachment {
        pretext: PRETEXT.to_string(),
        text: TEXT.to_string(),
        color: COLOR.to_string(),
        fields: Vec::with_capacity(lagging.len()),
    };

    for user in &lagging {
        let value = match runtime.slack_client().user_by_email(&user.email).await {
            Ok(Some(slack_user)) => {
                format!("<@{}> - {:.2} hours logged\n", slack_user.id, user.hours())
            }
            Ok(None) => format!("{} - {:.2} hours logged\n", user.email, user.hours()),
            Err(err) => {
                warn!("Slack lookup failed for {}: {err}", user.email);
                format!("{} - {:.2} hours logged\n", user.email, user.hours())
            }
        };
        attachment.fields.push(AttachmentField {
            value,
            ..AttachmentField::default()
        });
    }

    runtime
        .slack_client()
        .post_message(&runtime.config().slack.channel, &attachment)
        .await?;

    Ok(lagging.len())
}
