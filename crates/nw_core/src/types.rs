use serde::{Deserialize, Serialize};

/// One qualifying business-news article, as extracted from the feed.
///
/// `created_date` becomes the primary key of the `raw_data` table and `url`
/// is unique there, so duplicates across runs surface as constraint
/// violations at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
    pub created_date: String,
}
