use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, CategoryId, ContentKind, MediaItem};

/// Distinguishes repeated draws of the same category in a feed's tail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DrawToken {
    pub drawn_at: DateTime<Utc>,
    pub nonce: Uuid,
}

impl DrawToken {
    pub fn fresh() -> Self {
        Self {
            drawn_at: Utc::now(),
            nonce: Uuid::new_v4(),
        }
    }
}

/// An editorial row placed in the feed head
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixedRow {
    pub label: String,
    pub kind: ContentKind,
    pub items: Vec<MediaItem>,
}

impl FixedRow {
    pub fn new(label: &str, kind: ContentKind, items: Vec<MediaItem>) -> Self {
        Self {
            label: label.to_string(),
            kind,
            items,
        }
    }
}

/// One renderable section of the home feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedSection {
    Banner {
        items: Vec<MediaItem>,
    },
    FixedRow {
        label: String,
        kind: ContentKind,
        items: Vec<MediaItem>,
    },
    /// Filled lazily by the client from the genre endpoint
    PersonalizedRow {
        category_id: CategoryId,
        name: String,
        kind: ContentKind,
        draw: DrawToken,
    },
}

impl From<FixedRow> for FeedSection {
    fn from(row: FixedRow) -> Self {
        FeedSection::FixedRow {
            label: row.label,
            kind: row.kind,
            items: row.items,
        }
    }
}

impl FeedSection {
    pub fn personalized(category: &Category) -> Self {
        FeedSection::PersonalizedRow {
            category_id: category.id,
            name: category.name.clone(),
            kind: category.kind,
            draw: DrawToken::fresh(),
        }
    }

    pub fn draw_token(&self) -> Option<&DrawToken> {
        match self {
            FeedSection::PersonalizedRow { draw, .. } => Some(draw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personalized_section_shape() {
        let category = Category::new(27, "Horror Hits", ContentKind::Movie);
        let section = FeedSection::personalized(&category);

        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["type"], "personalized_row");
        assert_eq!(json["category_id"], 27);
        assert_eq!(json["name"], "Horror Hits");
        assert_eq!(json["kind"], "movie");
        assert!(json["draw"]["nonce"].is_string());
    }

    #[test]
    fn test_fresh_tokens_differ() {
        assert_ne!(DrawToken::fresh(), DrawToken::fresh());
    }

    #[test]
    fn test_fixed_row_conversion() {
        let section: FeedSection = FixedRow::new("Coming Soon", ContentKind::Movie, vec![]).into();
        assert!(matches!(section, FeedSection::FixedRow { ref label, .. } if label == "Coming Soon"));
        assert!(section.draw_token().is_none());
    }
}
