use std::collections::BTreeMap;
use chrono::{Local, SecondsFormat};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Every sticker keyed by its name
pub type StickerMap = BTreeMap<String, Sticker>;

/// A named reference to an image, plus who added it and when
#[derive(Serialize, Deserialize, Display, Clone, Eq, PartialEq, Debug)]
#[display(fmt = "{}", name)]
pub struct Sticker {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub added_by: String,
    #[serde(default)]
    pub added_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

impl Sticker {
    /// Creates a sticker stamped with the current time
    pub fn new(name: impl Into<String>, url: impl Into<String>, added_by: impl Into<String>) -> Self {
        Sticker {
            name: name.into(),
            url: url.into(),
            tags: vec![],
            added_by: added_by.into(),
            added_at: timestamp_now(),
            local_path: None,
        }
    }

    /// Builder-style tag assignment
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Current local time as RFC 3339, millisecond precision
pub fn timestamp_now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}
