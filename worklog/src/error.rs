use std::{io, path::PathBuf};

use jira::JiraError;
use slack::SlackError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum WorklogError {
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unknown timezone '{0}' in the configuration file")]
    UnknownTimezone(String),
    #[error("No observed email addresses configured")]
    NoObservedUsers,
    #[error("Jira error {0}")]
    Jira(String),
    #[error("Slack error {0}")]
    Slack(String),
}

impl From<JiraError> for WorklogError {
    fn from(err: JiraError) -> Self {
        WorklogError::Jira(format!("{err}"))
    }
}

impl From<SlackError> for WorklogError {
    fn from(err: SlackError) -> Self {
        WorklogError::Slack(format!("{err}"))
    }
}
