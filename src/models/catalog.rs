use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ContentKind;

/// Identifier of a content category (a provider genre id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named category the personalized feed can draw from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub kind: ContentKind,
}

impl Category {
    pub fn new(id: u32, name: &str, kind: ContentKind) -> Self {
        Self {
            id: CategoryId(id),
            name: name.to_string(),
            kind,
        }
    }
}

/// The genre bank used for the home feed's personalized tail
pub fn default_catalog() -> Vec<Category> {
    use ContentKind::{Movie, Tv};

    vec![
        Category::new(28, "Action Thrillers", Movie),
        Category::new(10765, "Sci-Fi & Fantasy TV", Tv),
        Category::new(27, "Horror Hits", Movie),
        Category::new(16, "Animation & Anime", Movie),
        Category::new(35, "Comedy Movies", Movie),
        Category::new(10749, "Romance", Movie),
        Category::new(18, "Critically Acclaimed Dramas", Movie),
        Category::new(10759, "Action & Adventure Series", Tv),
        Category::new(80, "Crime & Mystery", Movie),
        Category::new(10768, "War & Politics", Tv),
        Category::new(9648, "Mystery Thrillers", Movie),
        Category::new(37, "Westerns", Movie),
        Category::new(10762, "Kids' TV", Tv),
        Category::new(10766, "Soap Operas", Tv),
        Category::new(10763, "News & Current Events", Tv),
        Category::new(10764, "Reality TV", Tv),
        Category::new(10767, "Talk Shows", Tv),
    ]
}
