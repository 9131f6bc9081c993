//!
//! Core library for the `noty` worklog watcher: configuration, the
//! day-window policy, the aggregation pipeline and the Slack reminder,
//! wired together by [`ApplicationRuntime`].
use chrono_tz::Tz;
use jira::{Credentials, Jira};
use slack::Slack;

use config::AppConfiguration;
use error::WorklogError;
use types::{ObservedUsers, UserHours};

pub mod config;
pub mod date;
pub mod error;
pub mod operation;
pub mod types;

/// Everything a pipeline run needs: the loaded configuration and the two
/// API clients, constructed once at startup and passed by reference into
/// the operations. Runs triggered from it are independent of each other.
pub struct ApplicationRuntime {
    config: AppConfiguration,
    jira: Jira,
    slack: Slack,
    observed: ObservedUsers,
    timezone: Tz,
}

pub enum Operation {
    /// Report logged hours for every observed user
    Status,
    /// Post a Slack reminder to users below the threshold
    Notify,
}

pub enum OperationResult {
    Status(Vec<UserHours>),
    Notified { reminded: usize },
}

impl ApplicationRuntime {
    /// Creates a runtime from the configuration file on disk.
    ///
    /// # Errors
    ///
    /// - Returns an error if the configuration file is missing or unparsable.
    /// - Returns an error if the configured timezone is unknown, the
    ///   observed-email list is empty or the Jira URL does not parse.
    pub fn new() -> Result<Self, WorklogError> {
        let config = config::load()?;
        Self::with_configuration(config)
    }

    /// Creates a runtime from an already loaded configuration. Lets tests
    /// and embedders supply configuration without touching the filesystem.
    #[allow(clippy::missing_errors_doc)]
    pub fn with_configuration(config: AppConfiguration) -> Result<Self, WorklogError> {
        let jira = Jira::new(
            &config.jira.url,
            Credentials::Basic(config.jira.user.clone(), config.jira.token.clone()),
        )?;
        let slack = Slack::new(&config.slack.token)?;

        Self::with_clients(config, jira, slack)
    }

    /// Creates a runtime with explicitly supplied clients, e.g. ones
    /// pointing at a stub HTTP server.
    #[allow(clippy::missing_errors_doc)]
    pub fn with_clients(
        config: AppConfiguration,
        jira: Jira,
        slack: Slack,
    ) -> Result<Self, WorklogError> {
        let timezone = config.tracking.timezone()?;
        let observed = ObservedUsers::from_comma_separated(&config.tracking.emails);
        if observed.is_empty() {
            return Err(WorklogError::NoObservedUsers);
        }

        Ok(ApplicationRuntime {
            config,
            jira,
            slack,
            observed,
            timezone,
        })
    }

    pub fn config(&self) -> &AppConfiguration {
        &self.config
    }

    pub fn jira_client(&self) -> &Jira {
        &self.jira
    }

    pub fn slack_client(&self) -> &Slack {
        &self.slack
    }

    pub fn observed(&self) -> &ObservedUsers {
        &self.observed
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Executes the specified `Operation` and returns the result.
    ///
    /// # Errors
    ///
    /// Returns a `WorklogError` when the aggregation pipeline fails
    /// (transport or deserialization) or the Slack posting fails. A failed
    /// run leaves the runtime usable for the next trigger.
    pub async fn execute(&self, operation: Operation) -> Result<OperationResult, WorklogError> {
        match operation {
            Operation::Status => {
                let totals = operation::report::execute(self).await?;
                Ok(OperationResult::Status(operation::report::observed_totals(
                    &totals,
                    &self.observed,
                )))
            }
            Operation::Notify => {
                let reminded = operation::notify::execute(self).await?;
                Ok(OperationResult::Notified { reminded })
            }
        }
    }
}
