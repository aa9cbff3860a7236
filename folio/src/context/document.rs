use std::fmt;

use serde::Deserialize;

use crate::function::EnumKind;

/// The kind of document being produced. Affects rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Plain,
    Paged,
    Slides,
}

impl DocumentType {
    /// Lets functions take a document type as an enumeration argument.
    pub const KIND: EnumKind = EnumKind::new("DocumentType", &["plain", "paged", "slides"]);

    pub fn from_name(name: &str) -> Option<Self> {
        match Self::KIND.member(name)? {
            "plain" => Some(DocumentType::Plain),
            "paged" => Some(DocumentType::Paged),
            "slides" => Some(DocumentType::Slides),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Plain => "plain",
            DocumentType::Paged => "paged",
            DocumentType::Slides => "slides",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document-level metadata, writable by functions through the context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub locale: Option<String>,
    pub doc_type: DocumentType,
}
