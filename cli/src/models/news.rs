use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when a feed entry carries no publish date.
pub const NO_DATE_AVAILABLE: &str = "No Date Available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Published {
    At(String),
    Unavailable,
}

impl Published {
    pub fn from_feed(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(date) if !date.is_empty() => Published::At(date.to_string()),
            _ => Published::Unavailable,
        }
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::At(date) => f.write_str(date),
            Published::Unavailable => f.write_str(NO_DATE_AVAILABLE),
        }
    }
}

/// A scored headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub published: Published,
    /// VADER compound polarity in [-1, 1].
    pub sentiment: f64,
}

/// Result of a successful feed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NewsOutcome {
    Articles(Vec<NewsItem>),
    NoArticles,
}

impl NewsOutcome {
    pub fn from_items(items: Vec<NewsItem>) -> Self {
        if items.is_empty() {
            NewsOutcome::NoArticles
        } else {
            NewsOutcome::Articles(items)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NewsOutcome::Articles(items) => items.len(),
            NewsOutcome::NoArticles => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
