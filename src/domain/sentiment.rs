use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Band around zero treated as neutral news flow
const NEUTRAL_BAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentClassification {
    Bearish,
    Neutral,
    Bullish,
}

impl fmt::Display for SentimentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Bullish => write!(f, "Bullish"),
        }
    }
}

/// Aggregate news polarity for a ticker, conventionally in [-1.0, 1.0].
///
/// One score is broadcast across every historical row of a training pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScore(pub f64);

impl SentimentScore {
    pub const NEUTRAL: SentimentScore = SentimentScore(0.0);

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn classification(&self) -> SentimentClassification {
        if self.0 > NEUTRAL_BAND {
            SentimentClassification::Bullish
        } else if self.0 < -NEUTRAL_BAND {
            SentimentClassification::Bearish
        } else {
            SentimentClassification::Neutral
        }
    }

    /// Mean of the given per-article scores, neutral when there are none.
    pub fn average(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::NEUTRAL;
        }
        SentimentScore(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

impl From<f64> for SentimentScore {
    fn from(value: f64) -> Self {
        SentimentScore(value)
    }
}

impl fmt::Display for SentimentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.3}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Polarity of title + description, `None` when there was no text to score
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub score: SentimentScore,
    pub articles: Vec<NewsArticle>,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
}

impl SentimentReport {
    pub fn neutral(source: impl Into<String>) -> Self {
        Self {
            score: SentimentScore::NEUTRAL,
            articles: Vec::new(),
            fetched_at: Utc::now(),
            source: source.into(),
        }
    }
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Fetch the current aggregate news sentiment for a ticker
    async fn fetch_sentiment(
        &self,
        ticker: &str,
        company_name: &str,
    ) -> anyhow::Result<SentimentReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_bands() {
        assert_eq!(
            SentimentScore(0.2).classification(),
            SentimentClassification::Bullish
        );
        assert_eq!(
            SentimentScore(-0.3).classification(),
            SentimentClassification::Bearish
        );
        assert_eq!(
            SentimentScore(0.01).classification(),
            SentimentClassification::Neutral
        );
    }

    #[test]
    fn test_average_of_empty_is_neutral() {
        assert_eq!(SentimentScore::average(&[]), SentimentScore::NEUTRAL);
    }

    #[test]
    fn test_average() {
        let score = SentimentScore::average(&[0.5, -0.1, 0.2]);
        assert!((score.value() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_display_is_signed() {
        assert_eq!(SentimentScore(0.2).to_string(), "+0.200");
        assert_eq!(SentimentScore(-0.05).to_string(), "-0.050");
    }
}
