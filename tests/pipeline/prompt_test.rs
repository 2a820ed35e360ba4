//! Prompt layout.

use std::sync::Arc;

use quill::analyzer::Sentiment;
use quill::persona::{Category, PersonaConfig, PostMode};
use quill::prompt::PromptBuilder;

fn builder(mode: PostMode) -> (Arc<PersonaConfig>, PromptBuilder) {
    let persona = Arc::new(PersonaConfig::builtin().expect("valid persona"));
    let builder = PromptBuilder::new(Arc::clone(&persona), mode);
    (persona, builder)
}

#[test]
fn standard_prompt_layout() {
    let (persona, builder) = builder(PostMode::Standard);
    let prompt = builder.build(
        "Firedancer testnet",
        "Fun fact:",
        Sentiment::Positive,
        Category::Technical,
    );
    let lines: Vec<&str> = prompt.lines().collect();

    assert_eq!(
        lines,
        vec![
            "Fun fact: Firedancer testnet",
            "",
            persona.tone.as_str(),
            persona.mode_tone(PostMode::Standard),
            persona.guidance.get(Category::Technical).as_str(),
            "Angles you could take: how it works in one line; why builders care; speed you can feel.",
            "The mood is good. Match the energy without overhyping.",
            "Stay between 40 and 240 characters.",
            "Tweet:",
        ]
    );
}

#[test]
fn neutral_sentiment_uses_default_guidance() {
    let (persona, builder) = builder(PostMode::Standard);
    let prompt = builder.build("weekly recap", "Friends,", Sentiment::Neutral, Category::General);
    assert!(prompt.contains(&persona.sentiment_guidance.default));
}

#[test]
fn summary_mode_changes_tone_and_bounds() {
    let (persona, mut builder) = builder(PostMode::Standard);
    builder.set_mode(PostMode::Summary);
    assert_eq!(builder.mode(), PostMode::Summary);

    let prompt = builder.build("DeFi week", "Heads up:", Sentiment::Negative, Category::EcosystemFinance);
    assert!(prompt.contains(persona.mode_tone(PostMode::Summary)));
    assert!(!prompt.contains(persona.mode_tone(PostMode::Standard)));
    assert!(prompt.contains("Stay between 120 and 480 characters."));
    assert!(prompt.contains("acknowledge the concern"));
}

#[test]
fn prompt_ends_with_scaffold_marker() {
    let (_, builder) = builder(PostMode::Standard);
    for category in Category::ALL {
        let prompt = builder.build("topic", "Quick take:", Sentiment::Neutral, category);
        assert!(prompt.ends_with("\nTweet:"), "{category}");
    }
}

#[test]
fn topic_is_trimmed_and_build_is_pure() {
    let (_, builder) = builder(PostMode::Standard);
    let a = builder.build("  gas fees  ", "Real talk:", Sentiment::Neutral, Category::General);
    let b = builder.build("gas fees", "Real talk:", Sentiment::Neutral, Category::General);
    assert_eq!(a, b);
    assert!(a.starts_with("Real talk: gas fees\n"));
}
