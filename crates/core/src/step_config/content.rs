//! `content` step: a text, video, PDF or link lesson.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which kind of content the step presents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Text,
    Video,
    Pdf,
    Link,
}

/// Per-content-type fields. Only the fields relevant to the selected
/// [`ContentType`] are shown by the editor; the others are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContentData {
    /// Rich-text (HTML) body for `text` content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// External video URL (e.g. a streaming platform link).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub video_url: Option<String>,
    /// URL of an uploaded video asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_file_url: Option<String>,
    /// External PDF URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub pdf_url: Option<String>,
    /// URL of an uploaded PDF asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub link_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub link_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContentConfig {
    pub content_type: ContentType,
    #[validate(nested)]
    pub content_data: ContentData,
}

impl ContentConfig {
    pub fn is_complete(&self) -> bool {
        let data = &self.content_data;
        match self.content_type {
            ContentType::Text => non_blank(&data.text),
            ContentType::Video => non_blank(&data.video_url) || non_blank(&data.video_file_url),
            ContentType::Pdf => non_blank(&data.pdf_url) || non_blank(&data.pdf_file_url),
            ContentType::Link => non_blank(&data.link_url),
        }
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
