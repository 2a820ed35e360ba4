//! Category and sentiment classification.

use std::sync::Arc;

use quill::analyzer::{
    ContentAnalyzer, PolarityScores, ScorerError, Sentiment, SentimentScorer,
};
use quill::persona::{Category, PersonaConfig};

fn analyzer() -> ContentAnalyzer {
    let persona = PersonaConfig::builtin().expect("valid persona");
    ContentAnalyzer::with_lexicon(&persona)
}

struct BrokenScorer;

impl SentimentScorer for BrokenScorer {
    fn score(&self, _text: &str) -> Result<PolarityScores, ScorerError> {
        Err(ScorerError("model not loaded".to_owned()))
    }
}

#[test]
fn keywords_select_category() {
    let analyzer = analyzer();
    assert_eq!(analyzer.classify_category("Chart looks strong"), Category::Market);
    assert_eq!(
        analyzer.classify_category("Firedancer validator client ships"),
        Category::Technical
    );
    assert_eq!(
        analyzer.classify_category("New staking options land"),
        Category::EcosystemFinance
    );
    assert_eq!(analyzer.classify_category("Fresh NFT drop"), Category::Collectibles);
    assert_eq!(analyzer.classify_category("Hackathon kicks off"), Category::Community);
}

#[test]
fn matching_is_case_insensitive_substring() {
    assert_eq!(analyzer().classify_category("DEFI SUMMER"), Category::EcosystemFinance);
    assert_eq!(analyzer().classify_category("nfts everywhere"), Category::Collectibles);
}

#[test]
fn first_category_in_order_wins() {
    // market precedes collectibles, technical precedes ecosystem_finance.
    assert_eq!(analyzer().classify_category("NFT price rally"), Category::Market);
    assert_eq!(
        analyzer().classify_category("staking runtime upgrade"),
        Category::Technical
    );
}

#[test]
fn unmatched_topic_is_general() {
    assert_eq!(analyzer().classify_category("hello world"), Category::General);
    assert_eq!(analyzer().classify_category(""), Category::General);
}

#[test]
fn sentiment_follows_lexicon() {
    let analyzer = analyzer();
    assert_eq!(
        analyzer.classify_sentiment("Great launch, amazing community"),
        Sentiment::Positive
    );
    assert_eq!(
        analyzer.classify_sentiment("Bridge hacked, terrible losses"),
        Sentiment::Negative
    );
    assert_eq!(
        analyzer.classify_sentiment("Validators produced blocks on Tuesday"),
        Sentiment::Neutral
    );
}

#[test]
fn scorer_failure_is_neutral() {
    let persona = PersonaConfig::builtin().expect("valid persona");
    let analyzer = ContentAnalyzer::new(&persona, Arc::new(BrokenScorer));
    assert_eq!(analyzer.classify_sentiment("Great launch!"), Sentiment::Neutral);
}

#[test]
fn thresholds_map_compound_scores() {
    assert_eq!(Sentiment::from_compound(0.5), Sentiment::Positive);
    assert_eq!(Sentiment::from_compound(0.05), Sentiment::Neutral);
    assert_eq!(Sentiment::from_compound(0.0), Sentiment::Neutral);
    assert_eq!(Sentiment::from_compound(-0.05), Sentiment::Neutral);
    assert_eq!(Sentiment::from_compound(-0.3), Sentiment::Negative);
}

#[test]
fn analyze_combines_both() {
    let analysis = analyzer().analyze("Outage halted the network, bad day");
    assert_eq!(analysis.category, Category::Technical);
    assert_eq!(analysis.sentiment, Sentiment::Negative);
}
