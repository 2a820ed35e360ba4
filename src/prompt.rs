//! Prompt composition from persona, category, sentiment and opener.

use std::sync::Arc;

use crate::analyzer::Sentiment;
use crate::normalizer::SCAFFOLD_MARKER;
use crate::persona::{Category, PersonaConfig, PostMode};

/// Builds the instruction sent to the text generator. Pure: no I/O and no
/// history mutation; the opener is drawn by the caller.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: Arc<PersonaConfig>,
    mode: PostMode,
}

impl PromptBuilder {
    /// Builder for `persona` in `mode`.
    pub fn new(persona: Arc<PersonaConfig>, mode: PostMode) -> Self {
        Self { persona, mode }
    }

    /// Active mode.
    pub fn mode(&self) -> PostMode {
        self.mode
    }

    /// Switch between standard and summary tone/bounds.
    pub fn set_mode(&mut self, mode: PostMode) {
        self.mode = mode;
    }

    /// Compose the prompt.
    ///
    /// Order: opener and topic, blank line, base tone, mode tone, category
    /// guidance, hooks, sentiment guidance, length instruction, scaffold
    /// marker.
    pub fn build(
        &self,
        topic: &str,
        opener: &str,
        sentiment: Sentiment,
        category: Category,
    ) -> String {
        let persona = &self.persona;
        let bounds = persona.bounds(self.mode);

        let mut lines = vec![
            format!("{} {}", opener.trim(), topic.trim()).trim().to_owned(),
            String::new(),
            persona.tone.clone(),
            persona.mode_tone(self.mode).to_owned(),
            persona.guidance.get(category).clone(),
        ];

        let hooks = persona.hooks.get(category);
        if !hooks.is_empty() {
            lines.push(format!("Angles you could take: {}.", hooks.join("; ")));
        }

        lines.push(self.sentiment_guidance(sentiment).to_owned());
        lines.push(format!(
            "Stay between {} and {} characters.",
            bounds.min, bounds.max
        ));
        lines.push(SCAFFOLD_MARKER.to_owned());

        lines.join("\n")
    }

    fn sentiment_guidance(&self, sentiment: Sentiment) -> &str {
        let guidance = &self.persona.sentiment_guidance;
        let specific = match sentiment {
            Sentiment::Positive => guidance.positive.as_deref(),
            Sentiment::Neutral => guidance.neutral.as_deref(),
            Sentiment::Negative => guidance.negative.as_deref(),
        };
        specific.unwrap_or(&guidance.default)
    }
}
