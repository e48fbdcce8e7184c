//! Checklist types: categories of items, each with an optional answer.

use serde::{Deserialize, Serialize};

/// A safety checklist: ordered categories of ordered items.
///
/// `completed` is a flag set when the crew submits the checklist.
/// Whether every item has been answered is a separate, always-derived
/// question; see [`crate::checklist::is_complete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub question: String,
    pub kind: ItemKind,

    /// `None` until answered.
    #[serde(default)]
    pub answer: Option<Answer>,
}

/// How an item is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ItemKind {
    /// Single-line free text.
    Text,

    /// Multi-line free text.
    TextArea,

    /// One of a fixed set of options.
    SingleSelect { options: Vec<String> },

    /// A captured photo.
    Photo,
}

/// The answer recorded for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Answer {
    Text(String),
    Photo(PhotoPayload),
}

impl Answer {
    /// Short display form. Photo payloads are summarized, not printed.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Photo(photo) => format!("[photo, {} bytes]", photo.as_str().len()),
        }
    }
}

/// An opaque data-URI-like photo payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoPayload(String);

impl PhotoPayload {
    #[must_use]
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self(data_uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Checklist {
    /// Iterates over every item across all categories, in order.
    pub fn items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Number of items still lacking an answer.
    #[must_use]
    pub fn pending_items(&self) -> usize {
        self.items().filter(|i| i.answer.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_reads_tagged_json() {
        let item: ChecklistItem = serde_json::from_str(
            r#"{"id":"i1","question":"Camera ok?","kind":{"type":"single-select","options":["YES","NO"]}}"#,
        )
        .unwrap();
        assert!(matches!(item.kind, ItemKind::SingleSelect { ref options } if options.len() == 2));
        assert_eq!(item.answer, None);
    }

    #[test]
    fn photo_summary_hides_payload() {
        let answer = Answer::Photo(PhotoPayload::new("data:image/png;base64,AAAA"));
        assert_eq!(answer.summary(), "[photo, 26 bytes]");
    }
}
