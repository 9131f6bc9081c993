//!
//! `jira` is a small client for the parts of the Jira REST interface this
//! workspace cares about: the "worklog updated" feed and the bulk worklog
//! lookup. The types are declared specifically for work log reporting and
//! are hence not generic.
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{self, Formatter};

use log::debug;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::{ParseError, Url};

use models::worklog::{UpdatedWorklogsPage, WorklogEntry, WorklogIds};

pub mod models;

type Result<T> = std::result::Result<T, JiraError>;

/// Error payload Jira returns for 4xx responses
#[derive(Serialize, Deserialize, Debug)]
pub struct Errors {
    #[serde(rename = "errorMessages")]
    pub error_messages: Vec<String>,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum JiraError {
    Unauthorized,
    MethodNotAllowed,
    NotFound(String),
    Fault { code: StatusCode, errors: Errors },
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::JiraError::*;

        match self {
            Unauthorized => writeln!(f, "Jira rejected the supplied credentials"),
            MethodNotAllowed => writeln!(f, "Method not allowed"),
            NotFound(url) => writeln!(f, "Not found: '{url}'"),
            Fault {
                ref code,
                ref errors,
            } => writeln!(f, "Jira Client Error ({code}):\n{errors:#?}"),
            RequestError(e) => writeln!(f, "Internal error in reqwest library: {}", e.to_string().as_str()),
            SerializationError(e) => writeln!(f, "Could not serialize/deserialize: {e:?}!"),
            ParseError(e) => writeln!(f, "Could not connect to Jira: {e:?}!"),
        }
    }
}

impl Error for JiraError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JiraError::RequestError(e) => Some(e),
            JiraError::SerializationError(e) => Some(e),
            JiraError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for JiraError {
    fn from(error: ParseError) -> JiraError {
        JiraError::ParseError(error)
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(error: reqwest::Error) -> JiraError {
        JiraError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for JiraError {
    fn from(error: serde_json::error::Error) -> JiraError {
        JiraError::SerializationError(error)
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Basic(String, String),
    Bearer(String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Basic(ref user, ref pass) => {
                request.basic_auth(user.to_owned(), Some(pass.to_owned()))
            }
            Credentials::Bearer(ref token) => request.bearer_auth(token.to_owned()),
        }
    }
}

#[derive(Clone)]
pub struct Jira {
    host: Url,
    api: String,
    credentials: Credentials,
    pub client: Client,
}

impl Jira {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Jira>
    where
        H: Into<String>,
    {
        let host = Url::parse(&host.into())?;

        Ok(Jira {
            host,
            api: "api".to_string(),
            client: Client::new(),
            credentials,
        })
    }

    async fn request<D>(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        request = self.credentials.apply(request);

        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        match status {
            StatusCode::UNAUTHORIZED => Err(JiraError::Unauthorized),
            StatusCode::METHOD_NOT_ALLOWED => Err(JiraError::MethodNotAllowed),
            StatusCode::NOT_FOUND => Err(JiraError::NotFound(url.to_string())),
            client_err if client_err.is_client_error() => Err(JiraError::Fault {
                code: status,
                errors: serde_json::from_str::<Errors>(body)?,
            }),
            _ => {
                let data = if body.is_empty() { "null" } else { body };
                Ok(serde_json::from_str::<D>(data)?)
            }
        }
    }

    fn resource_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.host.join(&format!("rest/{}/3{endpoint}", self.api))?)
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get<D>(&self, endpoint: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.resource_url(endpoint)?;
        self.request::<D>(Method::GET, url, None).await
    }

    async fn post<D, S>(&self, endpoint: &str, body: S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(&body)?;
        let url = self.resource_url(endpoint)?;
        self.request::<D>(Method::POST, url, Some(data.into_bytes()))
            .await
    }

    /// Retrieves the identifiers of every worklog updated at or after the
    /// given instant (milliseconds since the epoch).
    ///
    /// The feed is paged; pages are followed via `nextPage` until Jira flags
    /// the last one, so the result covers the whole update window.
    #[allow(clippy::missing_errors_doc)]
    pub async fn updated_worklog_ids(&self, since_ms: i64) -> Result<BTreeSet<i64>> {
        let mut page = self
            .get::<UpdatedWorklogsPage>(&format!("/worklog/updated?since={since_ms}"))
            .await?;

        let mut ids: BTreeSet<i64> = page.values.iter().map(|v| v.worklogId).collect();

        // While Jira says there is another page ...
        while !page.lastPage {
            let Some(next) = page.nextPage else {
                break;
            };
            let url = Url::parse(&next)?;
            page = self
                .request::<UpdatedWorklogsPage>(Method::GET, url, None)
                .await?;
            ids.extend(page.values.iter().map(|v| v.worklogId));
        }
        debug!("Found {} updated worklog ids since {since_ms}", ids.len());

        Ok(ids)
    }

    /// Resolves a batch of worklog identifiers into full worklog entries.
    ///
    /// An empty batch short-circuits to an empty result without issuing a
    /// request, as Jira mishandles an empty `ids` list.
    #[allow(clippy::missing_errors_doc)]
    pub async fn worklog_details(&self, ids: &BTreeSet<i64>) -> Result<Vec<WorklogEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = WorklogIds {
            ids: ids.iter().copied().collect(),
        };
        self.post::<Vec<WorklogEntry>, WorklogIds>("/worklog/list", body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client_for(server: &Server) -> Jira {
        Jira::new(
            server.url(),
            Credentials::Basic("foo@bar.com".to_string(), String::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn updated_ids_single_page() -> Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/api/3/worklog/updated?since=1000")
            .with_status(200)
            .with_body(
                r#"{
                "values": [
                    {"worklogId": 101, "updatedTime": 1100, "properties": []},
                    {"worklogId": 102, "updatedTime": 1200, "properties": []}
                ],
                "since": 1000,
                "until": 2000,
                "self": "https://x/rest/api/3/worklog/updated?since=1000",
                "lastPage": true
            }"#,
            )
            .create_async()
            .await;

        let ids = client_for(&server).updated_worklog_ids(1000).await?;
        assert_eq!(ids, BTreeSet::from([101, 102]));
        Ok(())
    }

    #[tokio::test]
    async fn updated_ids_follows_next_page() -> Result<()> {
        let mut server = Server::new_async().await;
        let next_page = format!("{}/rest/api/3/worklog/updated?since=1200", server.url());
        let first = server
            .mock("GET", "/rest/api/3/worklog/updated?since=1000")
            .with_status(200)
            .with_body(format!(
                r#"{{
                "values": [{{"worklogId": 101, "updatedTime": 1100, "properties": []}}],
                "since": 1000,
                "until": 1200,
                "self": "https://x/page1",
                "nextPage": "{next_page}",
                "lastPage": false
            }}"#
            ))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/3/worklog/updated?since=1200")
            .with_status(200)
            .with_body(
                r#"{
                "values": [{"worklogId": 102, "updatedTime": 1300, "properties": []}],
                "since": 1200,
                "until": 2000,
                "self": "https://x/page2",
                "lastPage": true
            }"#,
            )
            .create_async()
            .await;

        let ids = client_for(&server).updated_worklog_ids(1000).await?;
        assert_eq!(ids, BTreeSet::from([101, 102]));
        first.assert_async().await;
        second.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn worklog_details_empty_batch_skips_request() -> Result<()> {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/rest/api/3/worklog/list")
            .expect(0)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let entries = client_for(&server)
            .worklog_details(&BTreeSet::new())
            .await?;
        assert!(entries.is_empty());
        list.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn worklog_details_parses_entries() -> Result<()> {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/rest/api/3/worklog/list")
            .match_body(r#"{"ids":[101,102]}"#)
            .with_status(200)
            .with_body(
                r#"[
                {
                    "author": {
                        "displayName": "A",
                        "accountId": "acc-a",
                        "active": true,
                        "emailAddress": "a@x.com"
                    },
                    "updateAuthor": {
                        "displayName": "A",
                        "accountId": "acc-a",
                        "active": true,
                        "emailAddress": "a@x.com"
                    },
                    "timeSpent": "1h",
                    "timeSpentSeconds": 3600,
                    "started": "2024-01-10T09:00:00.000+0300"
                },
                {
                    "author": {
                        "displayName": "B",
                        "accountId": "acc-b",
                        "active": true
                    },
                    "updateAuthor": {
                        "displayName": "B",
                        "accountId": "acc-b",
                        "active": true
                    },
                    "timeSpent": "2h",
                    "timeSpentSeconds": 7200,
                    "started": "2024-01-10T10:00:00.000+0300"
                }
            ]"#,
            )
            .create_async()
            .await;

        let entries = client_for(&server)
            .worklog_details(&BTreeSet::from([101, 102]))
            .await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].author.emailAddress.as_deref(), Some("a@x.com"));
        assert_eq!(entries[0].timeSpentSeconds, 3600);
        assert_eq!(entries[1].author.emailAddress, None);
        list.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn updated_ids_unauthorized() -> Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/api/3/worklog/updated?since=0")
            .with_status(401)
            .create_async()
            .await;

        match client_for(&server).updated_worklog_ids(0).await {
            Err(JiraError::Unauthorized) => Ok(()),
            other => panic!("Expected Unauthorized, got {other:?}"),
        }
    }
}
