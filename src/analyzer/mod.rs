//! Topic classification: category by keyword table, sentiment by lexicon.
//!
//! Both lookups are independent and side-effect free. The analyzer holds
//! only immutable tables, so one instance can serve concurrent requests.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::persona::{Category, CategoryMap, PersonaConfig};

pub mod lexicon;

pub use lexicon::LexiconScorer;

/// Compound score above which a topic counts as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score below which a topic counts as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Coarse sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// Compound score above [`POSITIVE_THRESHOLD`].
    Positive,
    /// Between the thresholds, or the scorer failed.
    Neutral,
    /// Compound score below [`NEGATIVE_THRESHOLD`].
    Negative,
}

impl Sentiment {
    /// Map a compound polarity score onto a label.
    pub fn from_compound(compound: f64) -> Self {
        if compound > POSITIVE_THRESHOLD {
            Self::Positive
        } else if compound < NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("positive"),
            Self::Neutral => f.write_str("neutral"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// Polarity scores returned by a [`SentimentScorer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScores {
    /// Normalized compound score, roughly in `[-1, 1]`.
    pub compound: f64,
    /// Sum of positive valences before normalization.
    pub positive: f64,
    /// Sum of negative valences before normalization (non-positive).
    pub negative: f64,
}

/// Sentiment scorer failure.
#[derive(Debug, thiserror::Error)]
#[error("sentiment scorer failed: {0}")]
pub struct ScorerError(pub String);

/// Lexicon-based polarity scorer collaborator.
pub trait SentimentScorer: Send + Sync {
    /// Score `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError`] if the scorer cannot produce a score.
    fn score(&self, text: &str) -> Result<PolarityScores, ScorerError>;
}

/// Category and sentiment derived from one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    /// Assigned category.
    pub category: Category,
    /// Coarse sentiment.
    pub sentiment: Sentiment,
}

/// Classifies topics into a [`Category`] and a [`Sentiment`].
pub struct ContentAnalyzer {
    keywords: CategoryMap<Vec<String>>,
    scorer: Arc<dyn SentimentScorer>,
}

impl ContentAnalyzer {
    /// Build an analyzer from persona keyword tables and a scorer.
    pub fn new(persona: &PersonaConfig, scorer: Arc<dyn SentimentScorer>) -> Self {
        let keywords = CategoryMap::from_fn(|category| {
            persona
                .keywords
                .get(category)
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        });
        Self { keywords, scorer }
    }

    /// Analyzer using the built-in [`LexiconScorer`].
    pub fn with_lexicon(persona: &PersonaConfig) -> Self {
        Self::new(persona, Arc::new(LexiconScorer::new()))
    }

    /// First category (in [`Category::ALL`] order) with a keyword occurring in
    /// `text`; [`Category::General`] when none match.
    pub fn classify_category(&self, text: &str) -> Category {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|(_, words)| words.iter().any(|w| lowered.contains(w.as_str())))
            .map_or(Category::General, |(category, _)| category)
    }

    /// Sentiment of `text`. Scorer failures resolve to [`Sentiment::Neutral`].
    pub fn classify_sentiment(&self, text: &str) -> Sentiment {
        match self.scorer.score(text) {
            Ok(scores) => Sentiment::from_compound(scores.compound),
            Err(e) => {
                warn!(error = %e, "sentiment scoring failed, defaulting to neutral");
                Sentiment::Neutral
            }
        }
    }

    /// Classify both category and sentiment.
    pub fn analyze(&self, text: &str) -> Analysis {
        Analysis {
            category: self.classify_category(text),
            sentiment: self.classify_sentiment(text),
        }
    }
}

impl fmt::Debug for ContentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentAnalyzer")
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}
