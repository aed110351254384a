use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod catalog;
pub mod feed;
pub mod preferences;
pub mod user;

pub use catalog::{default_catalog, Category, CategoryId};
pub use feed::{DrawToken, FeedSection, FixedRow};
pub use preferences::{DecayPolicy, PreferenceCounter};
pub use user::{AuthResponse, LoginRequest, ProfileUpdate, SignupRequest, User};

/// Kind of content a title or category belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trending window accepted by the metadata provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Day => f.write_str("day"),
            TimeWindow::Week => f.write_str("week"),
        }
    }
}

/// Sub-resources appended to a detail lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expansion {
    Videos,
    Credits,
    Similar,
}

impl Expansion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Expansion::Videos => "videos",
            Expansion::Credits => "credits",
            Expansion::Similar => "similar",
        }
    }
}

/// Expansions requested by the detail page
pub const DETAIL_EXPANSIONS: [Expansion; 3] =
    [Expansion::Videos, Expansion::Credits, Expansion::Similar];

pub const POPULARITY_DESC: &str = "popularity.desc";

// ============================================================================
// Metadata Provider Types
// ============================================================================

/// A single title in a provider list response
///
/// Only the fields the feed and search need are kept; everything else in the
/// provider document is dropped on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<CategoryId>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl MediaItem {
    /// Movies carry `title`, series and people carry `name`
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    pub fn is_person(&self) -> bool {
        self.media_type.as_deref() == Some("person")
    }
}

/// Paged list envelope used by every provider list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

/// Filters for the discover endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DiscoverFilters {
    #[serde(default)]
    pub genre: Option<CategoryId>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl DiscoverFilters {
    /// Query parameters for `/discover/{kind}`
    ///
    /// The release year maps to a different parameter for movies and series.
    pub fn query_pairs(&self, kind: ContentKind) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("include_adult", "false".to_string()),
            ("page", "1".to_string()),
        ];

        if let Some(genre) = self.genre {
            pairs.push(("with_genres", genre.to_string()));
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("with_origin_country", country.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort_by", sort.to_string()));
        }
        if let Some(year) = self.year {
            let param = match kind {
                ContentKind::Movie => "primary_release_year",
                ContentKind::Tv => "first_air_date_year",
            };
            pairs.push((param, year.to_string()));
        }

        pairs
    }

    /// Stable textual form used for cache keys
    pub fn cache_fragment(&self) -> String {
        format!(
            "g={};y={};c={};s={}",
            self.genre.map(|g| g.to_string()).unwrap_or_default(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.country.clone().unwrap_or_default(),
            self.sort.clone().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_serde() {
        assert_eq!(serde_json::to_string(&ContentKind::Tv).unwrap(), "\"tv\"");
        let kind: ContentKind = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(kind, ContentKind::Movie);
    }

    #[test]
    fn test_media_item_ignores_unknown_fields() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "genre_ids": [28, 878],
            "popularity": 83.1,
            "vote_average": 8.2,
            "adult": false,
            "original_language": "en"
        }"#;

        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 603);
        assert_eq!(item.display_title(), Some("The Matrix"));
        assert_eq!(item.genre_ids, vec![CategoryId(28), CategoryId(878)]);
        assert_eq!(item.media_type, None);
    }

    #[test]
    fn test_media_item_series_uses_name() {
        let json = r#"{"id": 1396, "name": "Breaking Bad", "media_type": "tv"}"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.display_title(), Some("Breaking Bad"));
        assert!(!item.is_person());
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<MediaItem> = serde_json::from_str("{}").unwrap();
        assert_eq!(page.page, 1);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_page_of_tmdb_list_body() {
        let json = r#"{
            "page": 1,
            "results": [
                {"adult": false, "id": 603, "title": "The Matrix", "media_type": "movie",
                 "genre_ids": [28, 878], "popularity": 81.2, "vote_average": 8.2,
                 "vote_count": 26000, "release_date": "1999-03-31",
                 "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg"},
                {"id": 1396, "name": "Breaking Bad", "media_type": "tv",
                 "first_air_date": "2008-01-20", "genre_ids": [18, 80]}
            ],
            "total_pages": 500,
            "total_results": 10000
        }"#;

        let page: Page<MediaItem> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 500);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].genre_ids, vec![CategoryId(28), CategoryId(878)]);
        assert_eq!(page.results[1].display_title(), Some("Breaking Bad"));
    }

    #[test]
    fn test_discover_movie_year_param() {
        let filters = DiscoverFilters {
            genre: Some(CategoryId(28)),
            year: Some(1999),
            country: Some("US".to_string()),
            sort: Some(POPULARITY_DESC.to_string()),
        };

        let pairs = filters.query_pairs(ContentKind::Movie);
        assert_eq!(
            pairs,
            vec![
                ("include_adult", "false".to_string()),
                ("page", "1".to_string()),
                ("with_genres", "28".to_string()),
                ("with_origin_country", "US".to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("primary_release_year", "1999".to_string()),
            ]
        );
    }

    #[test]
    fn test_discover_tv_year_param() {
        let filters = DiscoverFilters {
            year: Some(2008),
            ..Default::default()
        };

        let pairs = filters.query_pairs(ContentKind::Tv);
        assert!(pairs.contains(&("first_air_date_year", "2008".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "primary_release_year"));
    }

    #[test]
    fn test_discover_skips_empty_filters() {
        let filters = DiscoverFilters {
            country: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filters.query_pairs(ContentKind::Movie).len(), 2);
    }
}
