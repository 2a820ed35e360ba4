//! Built-in lexicon polarity scorer.
//!
//! Word valences on a -4..=4 scale, a three-word negation window, one-word
//! intensifiers, and the usual `s / sqrt(s² + alpha)` normalization into
//! `[-1, 1]`. Good enough to pick a guidance string; not a classifier.

use std::collections::{HashMap, HashSet};

use super::{PolarityScores, ScorerError, SentimentScorer};

/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;

/// Multiplier applied to a valence preceded by a negation.
const NEGATION_SCALAR: f64 = -0.74;

/// Multiplier applied to a valence preceded by an intensifier.
const INTENSIFIER_BOOST: f64 = 1.3;

/// Tokens before a sentiment word searched for negations.
const NEGATION_WINDOW: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "isn't",
    "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "can't", "won't", "wouldn't",
    "shouldn't", "without", "hardly",
];

const INTENSIFIERS: &[&str] = &[
    "very",
    "super",
    "really",
    "extremely",
    "incredibly",
    "massively",
    "totally",
    "insanely",
    "so",
    "hugely",
];

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("excellent", 3.2),
    ("love", 3.2),
    ("happy", 2.7),
    ("win", 2.8),
    ("wins", 2.7),
    ("winning", 2.4),
    ("success", 2.7),
    ("successful", 2.8),
    ("strong", 2.3),
    ("growth", 1.6),
    ("growing", 1.5),
    ("gain", 2.0),
    ("gains", 1.8),
    ("rally", 1.8),
    ("bullish", 2.4),
    ("moon", 1.9),
    ("record", 1.2),
    ("launch", 1.3),
    ("launches", 1.3),
    ("shipped", 1.6),
    ("upgrade", 1.4),
    ("fast", 1.3),
    ("faster", 1.5),
    ("cheap", 0.9),
    ("exciting", 2.2),
    ("excited", 2.3),
    ("celebrate", 2.7),
    ("thanks", 1.9),
    ("welcome", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("fun", 2.3),
    ("hope", 1.9),
    ("secure", 1.4),
    ("stable", 1.2),
    ("recover", 1.3),
    ("recovery", 1.4),
    ("breakthrough", 2.6),
    ("milestone", 1.8),
    ("partnership", 1.4),
    ("adoption", 1.3),
    ("innovative", 2.0),
    ("wow", 2.8),
    // negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("hate", -2.7),
    ("sad", -2.1),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("losing", -1.6),
    ("crash", -1.7),
    ("crashed", -1.9),
    ("dump", -1.6),
    ("dumping", -1.7),
    ("bearish", -2.0),
    ("fear", -2.2),
    ("panic", -2.3),
    ("scam", -2.8),
    ("hack", -2.1),
    ("hacked", -2.4),
    ("exploit", -2.0),
    ("exploited", -2.2),
    ("outage", -2.1),
    ("down", -1.0),
    ("slow", -1.2),
    ("congestion", -1.4),
    ("broken", -2.2),
    ("bug", -1.3),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("risk", -1.1),
    ("risky", -1.4),
    ("worried", -1.8),
    ("worry", -1.9),
    ("angry", -2.3),
    ("rug", -2.4),
    ("rugged", -2.5),
    ("dip", -0.8),
    ("drop", -1.1),
    ("plunge", -2.0),
    ("worst", -3.1),
    ("worse", -2.1),
    ("problem", -1.7),
    ("delay", -1.3),
    ("delayed", -1.4),
    ("halt", -1.5),
    ("halted", -1.7),
];

/// Word-valence scorer backed by an embedded lexicon.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    intensifiers: HashSet<&'static str>,
}

impl LexiconScorer {
    /// Scorer over the built-in lexicon.
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    fn word_valence(&self, tokens: &[String], i: usize) -> Option<f64> {
        let token = tokens.get(i)?;
        let mut valence = *self.valences.get(token.as_str())?;

        if let Some(prev) = i.checked_sub(1).and_then(|p| tokens.get(p)) {
            if self.intensifiers.contains(prev.as_str()) {
                valence *= INTENSIFIER_BOOST;
            }
        }

        let window_start = i.saturating_sub(NEGATION_WINDOW);
        let negated = tokens
            .get(window_start..i)
            .is_some_and(|w| w.iter().any(|t| self.negations.contains(t.as_str())));
        if negated {
            valence *= NEGATION_SCALAR;
        }
        Some(valence)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<PolarityScores, ScorerError> {
        let tokens = tokenize(text);

        let mut positive = 0.0_f64;
        let mut negative = 0.0_f64;
        for i in 0..tokens.len() {
            match self.word_valence(&tokens, i) {
                Some(v) if v > 0.0 => positive += v,
                Some(v) => negative += v,
                None => {}
            }
        }

        Ok(PolarityScores {
            compound: normalize(positive + negative),
            positive,
            negative,
        })
    }
}

/// Lower-case word tokens; apostrophes are kept so contractions match.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

fn normalize(score: f64) -> f64 {
    if score == 0.0 {
        return 0.0;
    }
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}
