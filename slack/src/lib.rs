//!
//! `slack` is a thin client for the two Slack Web API methods the reminder
//! flow needs: posting a message with an attachment to a channel and looking
//! up a workspace user by email address.
use std::error::Error;
use std::fmt::{self, Formatter};

use log::debug;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::{ParseError, Url};

use models::{Attachment, LookupResponse, PostMessage, PostResponse, SlackUser};

pub mod models;

type Result<T> = std::result::Result<T, SlackError>;

const DEFAULT_HOST: &str = "https://slack.com/";

#[derive(Debug)]
pub enum SlackError {
    /// Slack answered `ok: false`; carries the `error` code from the payload
    Api(String),
    UnexpectedStatus(StatusCode),
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for SlackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::SlackError::*;

        match self {
            Api(code) => writeln!(f, "Slack API error: '{code}'"),
            UnexpectedStatus(sc) => writeln!(f, "Unexpected HTTP status from Slack: {sc}"),
            RequestError(e) => writeln!(f, "Internal error in reqwest library: {}", e.to_string().as_str()),
            SerializationError(e) => writeln!(f, "Could not serialize/deserialize: {e:?}!"),
            ParseError(e) => writeln!(f, "Could not connect to Slack: {e:?}!"),
        }
    }
}

impl Error for SlackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SlackError::RequestError(e) => Some(e),
            SlackError::SerializationError(e) => Some(e),
            SlackError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for SlackError {
    fn from(error: ParseError) -> SlackError {
        SlackError::ParseError(error)
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(error: reqwest::Error) -> SlackError {
        SlackError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for SlackError {
    fn from(error: serde_json::error::Error) -> SlackError {
        SlackError::SerializationError(error)
    }
}

#[derive(Clone)]
pub struct Slack {
    host: Url,
    token: String,
    pub client: Client,
}

impl Slack {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<T>(token: T) -> Result<Slack>
    where
        T: Into<String>,
    {
        Slack::with_host(DEFAULT_HOST, token)
    }

    /// Mainly useful for pointing the client at a test server
    #[allow(clippy::missing_errors_doc)]
    pub fn with_host<H, T>(host: H, token: T) -> Result<Slack>
    where
        H: Into<String>,
        T: Into<String>,
    {
        let host = Url::parse(&host.into())?;

        Ok(Slack {
            host,
            token: token.into(),
            client: Client::new(),
        })
    }

    async fn request<D, S>(&self, method: Method, endpoint: &str, body: Option<&S>) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let url = self.host.join(&format!("api/{endpoint}"))?;

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .bearer_auth(&self.token);

        if let Some(body) = body {
            request = request.body(serde_json::to_string(body)?);
        }
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        if !status.is_success() {
            return Err(SlackError::UnexpectedStatus(status));
        }
        Ok(serde_json::from_str::<D>(body)?)
    }

    /// Posts a message with a single attachment to the given channel.
    #[allow(clippy::missing_errors_doc)]
    pub async fn post_message(&self, channel: &str, attachment: &Attachment) -> Result<()> {
        let body = PostMessage {
            channel: channel.to_string(),
            attachments: vec![attachment.clone()],
        };
        let response = self
            .request::<PostResponse, PostMessage>(Method::POST, "chat.postMessage", Some(&body))
            .await?;
        if response.ok {
            Ok(())
        } else {
            Err(SlackError::Api(response.error.unwrap_or_default()))
        }
    }

    /// Looks up a workspace user by email address.
    ///
    /// Returns `Ok(None)` when Slack reports `users_not_found`; any other
    /// API-level error is surfaced as `SlackError::Api`.
    #[allow(clippy::missing_errors_doc)]
    pub async fn user_by_email(&self, email: &str) -> Result<Option<SlackUser>> {
        let endpoint = format!(
            "users.lookupByEmail?email={}",
            url::form_urlencoded::byte_serialize(email.as_bytes()).collect::<String>()
        );
        let response = self
            .request::<LookupResponse, ()>(Method::GET, &endpoint, None)
            .await?;
        if response.ok {
            Ok(response.user)
        } else {
            match response.error.as_deref() {
                Some("users_not_found") => Ok(None),
                _ => Err(SlackError::Api(response.error.unwrap_or_default())),
            }
        }
    }
}
