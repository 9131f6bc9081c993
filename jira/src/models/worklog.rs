use super::core::Author;
use serde::{Deserialize, Serialize};

/// One page of the `/worklog/updated` feed
#[derive(Debug, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct UpdatedWorklogsPage {
    pub values: Vec<UpdatedWorklog>,
    pub since: i64,
    pub until: i64,
    #[serde(alias = "self")]
    pub self_url: String,
    pub nextPage: Option<String>,
    pub lastPage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct UpdatedWorklog {
    pub worklogId: i64,
    pub updatedTime: i64,
    #[serde(default)]
    pub properties: Vec<serde_json::Value>,
}

/// Request body for `/worklog/list`
#[derive(Debug, Serialize, Deserialize)]
pub struct WorklogIds {
    pub ids: Vec<i64>,
}

/// A single worklog entry as returned by `/worklog/list`.
///
/// `started` is kept as the raw timestamp string; parsing it (and the policy
/// for entries that do not parse) belongs to the aggregation layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[allow(non_snake_case)]
pub struct WorklogEntry {
    pub author: Author,
    pub updateAuthor: Author,
    pub timeSpent: String,
    pub timeSpentSeconds: i64,
    pub started: String,
}
