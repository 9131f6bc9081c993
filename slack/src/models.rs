use serde::{Deserialize, Serialize};

/// Message attachment, the legacy Slack layout the reminder uses
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub pretext: String,
    pub text: String,
    pub color: String,
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub short: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostMessage {
    pub channel: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    pub ok: bool,
    #[serde(default)]
    pub user: Option<SlackUser>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}
