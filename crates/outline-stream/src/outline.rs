use std::fmt;

/// Stable identifier for the document an outline stream targets.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Creates a document id from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the document id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One outline item in presentation order.
///
/// `content` defaults to empty so an item object that is still being decoded
/// mid-stream deserializes instead of failing the whole snapshot.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineItem {
    /// Item text.
    #[serde(default)]
    pub content: String,
}

impl OutlineItem {
    /// Creates an item from any string-like value.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_without_content_field_deserializes_empty() {
        let item: OutlineItem = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(item.content, "");
    }
}
