//! Candidate result types shared by the three store adapters.

use serde::{Deserialize, Serialize};

/// Which backend produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Dense-vector similarity search.
    Vector,
    /// Entity-relationship graph traversal.
    Graph,
    /// Full-text/keyword document search.
    Document,
}

impl SourceKind {
    /// Human-readable label, used in logs and API responses.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Vector => "vector",
            SourceKind::Graph => "graph",
            SourceKind::Document => "document",
        }
    }

    /// Tie-break priority. Lower is higher priority: vector > graph > document.
    pub fn priority(self) -> u8 {
        match self {
            SourceKind::Vector => 0,
            SourceKind::Graph => 1,
            SourceKind::Document => 2,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A related entity reference returned by the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbour {
    /// ID of the related entity.
    pub id: String,

    /// Display name of the related entity.
    pub name: String,

    /// Relation-type label connecting it to the matched entity.
    pub relation: String,
}

/// Source-specific content carried by a candidate.
///
/// Each store returns a different shape; keeping them as a tagged union
/// (rather than a loose map) means downstream code matches exhaustively
/// instead of probing for fields. [`Payload::display_text`] is the single
/// projection used for logging and content-hash merge keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// A text snippet attached to a vector hit.
    Snippet { text: String },

    /// A graph entity together with its connected neighbours.
    Entity {
        name: String,
        description: String,
        neighbours: Vec<Neighbour>,
    },

    /// Document fields from the full-text store.
    Document { title: String, body: String },
}

impl Payload {
    /// The primary text field of this payload.
    pub fn display_text(&self) -> &str {
        match self {
            Payload::Snippet { text } => text,
            Payload::Entity { description, name, .. } => {
                if description.is_empty() { name } else { description }
            }
            Payload::Document { body, title } => {
                if body.is_empty() { title } else { body }
            }
        }
    }
}

/// One retrieved item from a single source.
///
/// `raw_score` is on the source's own scale: the vector adapter already
/// maps it into `[0, 1]`, graph and document scores are normalized later
/// by the fusion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Identifier, unique within the originating source.
    pub id: String,

    /// Which backend produced this candidate.
    pub source_kind: SourceKind,

    /// Source-scale relevance score.
    pub raw_score: f32,

    /// Source-specific content.
    pub payload: Payload,
}

impl CandidateResult {
    /// Create a new candidate.
    pub fn new(
        id: impl Into<String>,
        source_kind: SourceKind,
        raw_score: f32,
        payload: Payload,
    ) -> Self {
        Self {
            id: id.into(),
            source_kind,
            raw_score,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_priority_order() {
        assert!(SourceKind::Vector.priority() < SourceKind::Graph.priority());
        assert!(SourceKind::Graph.priority() < SourceKind::Document.priority());
    }

    #[test]
    fn test_display_text_projection() {
        let snippet = Payload::Snippet {
            text: "alpha".to_string(),
        };
        assert_eq!(snippet.display_text(), "alpha");

        let entity = Payload::Entity {
            name: "Rust".to_string(),
            description: String::new(),
            neighbours: vec![],
        };
        assert_eq!(entity.display_text(), "Rust");

        let doc = Payload::Document {
            title: "Guide".to_string(),
            body: "full body".to_string(),
        };
        assert_eq!(doc.display_text(), "full body");
    }

    #[test]
    fn test_payload_serde_tagging() {
        let payload = Payload::Document {
            title: "t".to_string(),
            body: "b".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "document");
    }
}
