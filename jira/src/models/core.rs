use serde::{Deserialize, Serialize};

/// Represents the author (user) of a worklog item
#[derive(Debug, Deserialize, Serialize, PartialOrd, PartialEq, Eq, Hash, Clone)]
#[allow(non_snake_case)]
pub struct Author {
    pub accountId: String,
    pub displayName: String,
    #[serde(default)]
    pub active: bool,
    // Jira omits the email address for users who have hidden it
    pub emailAddress: Option<String>,
}
