pub mod newsapi;
pub mod sentiment_analyzer;

pub use newsapi::NewsApiSentimentProvider;
pub use sentiment_analyzer::SentimentAnalyzer;
