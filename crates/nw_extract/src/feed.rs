use serde::Deserialize;

use nw_core::{Article, Error, Result};

/// Wire shape of the NYT news feed. Fields beyond the ones named here are
/// ignored; the named ones are required on every element, and a payload that
/// drops any of them is rejected as malformed.
#[derive(Debug, Deserialize)]
pub struct NewsFeed {
    pub results: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    pub item_type: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub title: String,
    pub url: String,
    pub created_date: String,
}

const SNIPPET_LEN: usize = 256;

/// Truncated payload excerpt carried inside malformed-response errors.
fn snippet(payload: &str) -> String {
    if payload.len() <= SNIPPET_LEN {
        return payload.to_string();
    }
    let end = payload
        .char_indices()
        .take_while(|(i, _)| *i <= SNIPPET_LEN)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("{}...", &payload[..end])
}

impl NewsFeed {
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| Error::MalformedResponse {
            reason: e.to_string(),
            payload: snippet(payload),
        })
    }

    /// Keep the feed items that are articles with a non-empty abstract, in
    /// feed order. Matching is exact and case-sensitive, no trimming.
    pub fn select_articles(self) -> Vec<Article> {
        self.results
            .into_iter()
            .filter(|item| item.item_type == "Article" && !item.abstract_text.is_empty())
            .map(|item| Article {
                title: item.title,
                abstract_text: item.abstract_text,
                url: item.url,
                created_date: item.created_date,
            })
            .collect()
    }
}
