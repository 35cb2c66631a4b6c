//! Headline polarity using the VADER lexicon.
//!
//! VADER is rule-based with a fixed lexicon, so a given text always yields
//! the same compound score.

use crate::models::{NewsItem, Published};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound polarity of `text`, normalized to [-1, 1].
pub fn compound(text: &str) -> f64 {
    compound_with(&SentimentIntensityAnalyzer::new(), text)
}

fn compound_with(analyzer: &SentimentIntensityAnalyzer, text: &str) -> f64 {
    analyzer
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}

/// Score every headline with one analyzer instance.
pub fn score_headlines<I>(entries: I) -> Vec<NewsItem>
where
    I: IntoIterator<Item = (String, Published)>,
{
    let analyzer = SentimentIntensityAnalyzer::new();
    entries
        .into_iter()
        .map(|(title, published)| {
            let sentiment = compound_with(&analyzer, &title);
            NewsItem {
                title,
                published,
                sentiment,
            }
        })
        .collect()
}
