//! Headline sentiment scoring using VADER
//!
//! Scores news headlines and descriptions with the VADER (Valence Aware
//! Dictionary and sEntiment Reasoner) compound score, boosted by equity-market
//! phrases that VADER's general lexicon rates as neutral.
//!
//! # Example
//! ```rust,ignore
//! use stocksight::infrastructure::news::sentiment_analyzer::SentimentAnalyzer;
//!
//! let analyzer = SentimentAnalyzer::new();
//! let score = analyzer.analyze("Apple beats earnings estimates, raises guidance");
//! assert!(score > 0.0);
//! ```

use vader_sentiment::SentimentIntensityAnalyzer;

/// Weight applied to the summed keyword boost before adding it to the VADER score
const BOOST_WEIGHT: f64 = 0.5;

const BULLISH_KEYWORDS: &[(&str, f64)] = &[
    ("beats estimates", 0.5),
    ("beat estimates", 0.5),
    ("earnings beat", 0.5),
    ("tops estimates", 0.4),
    ("record revenue", 0.4),
    ("record high", 0.4),
    ("all-time high", 0.4),
    ("raises guidance", 0.5),
    ("raised guidance", 0.5),
    ("upgrade", 0.3),
    ("upgraded", 0.3),
    ("outperform", 0.3),
    ("buyback", 0.3),
    ("dividend increase", 0.3),
    ("fda approval", 0.5),
    ("surge", 0.4),
    ("surges", 0.4),
    ("soars", 0.4),
    ("rally", 0.3),
    ("rallies", 0.3),
    ("bullish", 0.4),
    ("breakout", 0.3),
    ("partnership", 0.2),
];

const BEARISH_KEYWORDS: &[(&str, f64)] = &[
    ("misses estimates", -0.5),
    ("missed estimates", -0.5),
    ("earnings miss", -0.5),
    ("cuts guidance", -0.5),
    ("lowers guidance", -0.5),
    ("downgrade", -0.3),
    ("downgraded", -0.3),
    ("underperform", -0.3),
    ("lawsuit", -0.4),
    ("investigation", -0.3),
    ("recall", -0.3),
    ("layoffs", -0.3),
    ("bankruptcy", -0.6),
    ("plunge", -0.5),
    ("plunges", -0.5),
    ("tumbles", -0.4),
    ("sell-off", -0.4),
    ("selloff", -0.4),
    ("bearish", -0.4),
    ("fraud", -0.5),
    ("delisted", -0.5),
];

/// A thread-safe headline analyzer combining VADER with equities keyword boosting.
pub struct SentimentAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    fn keyword_boost(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();

        BULLISH_KEYWORDS
            .iter()
            .chain(BEARISH_KEYWORDS.iter())
            .filter(|(keyword, _)| text_lower.contains(keyword))
            .map(|(_, score)| score)
            .sum()
    }

    /// Polarity of `text` in `[-1.0, 1.0]`; `0.0` for blank text.
    pub fn analyze(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        let combined = scores["compound"] + self.keyword_boost(text) * BOOST_WEIGHT;
        combined.clamp(-1.0, 1.0)
    }

    /// Scores `title + " " + description`. `None` when there is no text at all,
    /// so the article is left out of the average.
    pub fn analyze_article(&self, title: &str, description: Option<&str>) -> Option<f64> {
        let text = match description {
            Some(description) => format!("{} {}", title, description),
            None => title.to_string(),
        };

        if text.trim().is_empty() {
            return None;
        }
        Some(self.analyze(&text))
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
