/// Media descriptors returned by the extraction backend

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::rc::Rc;
use uuid::Uuid;

/// Href used when an item carries no download link at all
pub const DEAD_LINK: &str = "#";

/// Kind of media item, decided by the backend's `type` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum MediaKind {
    Video,
    Image,
    /// Anything else, kept verbatim for display
    Other(String),
}

impl From<Option<String>> for MediaKind {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("video") => MediaKind::Video,
            Some("image") => MediaKind::Image,
            Some(other) => MediaKind::Other(other.to_string()),
            None => MediaKind::Other(String::new()),
        }
    }
}

impl Default for MediaKind {
    fn default() -> Self {
        MediaKind::Other(String::new())
    }
}

impl MediaKind {
    /// Badge text: the type name with its first letter capitalized
    pub fn label(&self) -> String {
        match self {
            MediaKind::Video => "Video".to_string(),
            MediaKind::Image => "Image".to_string(),
            MediaKind::Other(raw) if raw.is_empty() => "Media".to_string(),
            MediaKind::Other(raw) => capitalize(raw),
        }
    }
}

/// One downloadable or streamable item
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaDescriptor {
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    pub filename: Option<String>,
    pub size: Option<String>,
    pub thumbnail: Option<String>,
    pub stream_url: Option<String>,
    pub proxy_download: Option<String>,
    pub dlink: Option<String>,
}

impl MediaDescriptor {
    /// Display title, falling back to a positional name (`index` is 0-based)
    pub fn title(&self, index: usize) -> String {
        present(&self.filename)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Instagram Media {}", index + 1))
    }

    pub fn size_label(&self) -> String {
        present(&self.size).unwrap_or("0 MB").to_string()
    }

    pub fn thumbnail_src(&self) -> String {
        present(&self.thumbnail).unwrap_or_default().to_string()
    }

    pub fn stream_src(&self) -> Option<&str> {
        present(&self.stream_url)
    }

    /// The proxied download wins over the direct link; neither gives a dead link
    pub fn download_href(&self) -> String {
        present(&self.proxy_download)
            .or_else(|| present(&self.dlink))
            .unwrap_or(DEAD_LINK)
            .to_string()
    }
}

/// Body of a successful extraction: a list under `media`, or one bare item.
///
/// The body counts as a single item only when `media` is absent or null; a
/// present `media` that is not a valid list is a decode error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResponse {
    Many { media: Vec<MediaDescriptor> },
    Single(MediaDescriptor),
}

impl<'de> Deserialize<'de> for ExtractionResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut body = serde_json::Value::deserialize(deserializer)?;

        match body.get_mut("media").map(serde_json::Value::take) {
            Some(media) if !media.is_null() => serde_json::from_value(media)
                .map(|media| ExtractionResponse::Many { media })
                .map_err(de::Error::custom),
            _ => serde_json::from_value(body)
                .map(ExtractionResponse::Single)
                .map_err(de::Error::custom),
        }
    }
}

impl ExtractionResponse {
    pub fn into_items(self) -> Vec<MediaDescriptor> {
        match self {
            ExtractionResponse::Many { media } => media,
            ExtractionResponse::Single(item) => vec![item],
        }
    }
}

/// One rendered batch of results, replaced wholesale on every extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub id: Uuid,
    pub items: Rc<Vec<MediaDescriptor>>,
}

impl ResultSet {
    pub fn new(id: Uuid, items: Vec<MediaDescriptor>) -> Self {
        ResultSet {
            id,
            items: Rc::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// Empty strings count as absent, same as a missing field.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
