use crate::error::WorklogError;
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Application configuration struct
/// Holds the data we need to connect to Jira and Slack plus the reporting
/// parameters (observed users, threshold and the canonical timezone)
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct AppConfiguration {
    pub jira: JiraConfiguration,
    pub slack: SlackConfiguration,
    pub tracking: TrackingConfiguration,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct JiraConfiguration {
    /// Base URL of the Jira instance, e.g. `https://company.atlassian.net`
    pub url: String,
    pub user: String,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SlackConfiguration {
    pub token: String,
    /// Channel the reminder is posted to, e.g. `#timelog`
    pub channel: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct TrackingConfiguration {
    /// Comma-delimited list of email addresses to report on
    pub emails: String,
    /// Users who logged strictly fewer whole hours than this get a reminder
    pub threshold_hours: i64,
    /// The day boundary is anchored to this zone no matter where the
    /// process runs
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl TrackingConfiguration {
    /// Resolves the configured timezone name against the tz database.
    ///
    /// # Errors
    /// Returns `WorklogError::UnknownTimezone` for names the database does
    /// not know, which is fatal at startup.
    pub fn timezone(&self) -> Result<Tz, WorklogError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| WorklogError::UnknownTimezone(self.timezone.clone()))
    }
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

/// Filename holding the application configuration parameters
#[must_use]
pub fn configuration_file() -> PathBuf {
    project_dirs().preference_dir().into()
}

#[allow(clippy::missing_errors_doc)]
pub fn load() -> Result<AppConfiguration, WorklogError> {
    read(&configuration_file())
}

fn project_dirs() -> ProjectDirs {
    ProjectDirs::from("com", "noty", "noty")
        .expect("Unable to determine the name of the 'project_dirs' directory name")
}

/// Reads the `AppConfiguration` struct from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, WorklogError> {
    let mut file = File::open(path).map_err(|source| WorklogError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| WorklogError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    toml::from_str::<AppConfiguration>(&contents).map_err(|source| WorklogError::TomlParse {
        path: path.into(),
        source,
    })
}
