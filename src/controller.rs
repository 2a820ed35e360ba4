//! Generation controller: the retry loop that turns a topic into a post.
//!
//! Each call walks `build prompt -> invoke generator -> normalize -> style ->
//! validate` up to `max_attempts` times. The first valid text is returned;
//! on exhaustion a curated fallback eligible for the active mode is returned
//! instead. The only caller-visible error is an empty topic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::analyzer::{Analysis, ContentAnalyzer, Sentiment};
use crate::config::{GenerationConfig, StyleConfig};
use crate::generator::{GeneratorError, TextGenerator};
use crate::normalizer::{NormalizerError, TextNormalizer};
use crate::persona::{Category, LengthBounds, PersonaConfig, PostMode};
use crate::prompt::PromptBuilder;
use crate::style::{StyleEngine, StyleHistory};
use crate::validator::{self, ValidationFailure};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Where a returned post came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrigin {
    /// Generated text accepted on the given attempt (1-based).
    Generated {
        /// Attempt that produced the post.
        attempt: u32,
    },
    /// Curated fallback after every attempt failed.
    Fallback,
}

/// A postable string and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Final text, within the active mode's bounds.
    pub text: String,
    /// Provenance.
    pub origin: PostOrigin,
}

impl Post {
    /// Whether this post is a curated fallback.
    pub fn is_fallback(&self) -> bool {
        self.origin == PostOrigin::Fallback
    }
}

/// Caller-visible generation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The topic was empty or whitespace only.
    #[error("topic must not be empty")]
    EmptyTopic,
}

/// Errors raised while assembling a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// No curated fallback satisfies the bounds of a mode.
    #[error("no fallback post fits the {mode} mode bounds")]
    NoEligibleFallback {
        /// Mode without an eligible fallback.
        mode: PostMode,
    },
    /// A canonicalization rule failed to compile.
    #[error(transparent)]
    Normalizer(#[from] NormalizerError),
}

/// Why a single attempt was rejected. Never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum AttemptFailure {
    /// The generator errored, timed out or returned nothing.
    #[error("generator failed: {0}")]
    Generator(#[from] GeneratorError),
    /// The processed text failed validation.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationFailure),
}

/// Record of one pass through the pipeline, kept only for logging.
#[derive(Debug)]
pub struct GenerationAttempt {
    /// Attempt number, 1-based.
    pub number: u32,
    /// Trimmed topic.
    pub topic: String,
    /// Topic category.
    pub category: Category,
    /// Topic sentiment.
    pub sentiment: Sentiment,
    /// Prompt sent to the generator.
    pub prompt: String,
    /// Raw generator output.
    pub raw: Option<String>,
    /// Text after normalization (and truncation).
    pub normalized: Option<String>,
    /// Text after decoration.
    pub styled: Option<String>,
}

// ---------------------------------------------------------------------------
// Fallback pool
// ---------------------------------------------------------------------------

/// Fallbacks pre-filtered per mode.
#[derive(Debug, Clone)]
struct FallbackPool {
    standard: Vec<String>,
    summary: Vec<String>,
}

impl FallbackPool {
    fn build(persona: &PersonaConfig, normalizer: &TextNormalizer) -> Result<Self, ControllerError> {
        let normalized: Vec<String> = persona
            .fallbacks
            .iter()
            .map(|text| normalizer.normalize(text))
            .collect();

        let eligible = |mode: PostMode| -> Result<Vec<String>, ControllerError> {
            let bounds = persona.bounds(mode);
            let pool: Vec<String> = normalized
                .iter()
                .filter(|text| validator::validate(text, bounds).is_ok())
                .cloned()
                .collect();
            if pool.is_empty() {
                return Err(ControllerError::NoEligibleFallback { mode });
            }
            Ok(pool)
        };

        Ok(Self {
            standard: eligible(PostMode::Standard)?,
            summary: eligible(PostMode::Summary)?,
        })
    }

    fn for_mode(&self, mode: PostMode) -> &[String] {
        match mode {
            PostMode::Standard => &self.standard,
            PostMode::Summary => &self.summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Orchestrates analysis, prompting, generation, cleanup and fallback.
pub struct GenerationController {
    persona: Arc<PersonaConfig>,
    generator: Arc<dyn TextGenerator>,
    analyzer: ContentAnalyzer,
    normalizer: TextNormalizer,
    prompt: PromptBuilder,
    style: Mutex<StyleEngine>,
    fallbacks: FallbackPool,
    max_attempts: u32,
}

impl std::fmt::Debug for GenerationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationController")
            .field("persona", &self.persona.name)
            .field("mode", &self.prompt.mode())
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl GenerationController {
    /// Controller with the lexicon scorer and an entropy-seeded style engine.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if canonical rules do not compile or a mode
    /// has no eligible fallback.
    pub fn new(
        persona: Arc<PersonaConfig>,
        generator: Arc<dyn TextGenerator>,
        generation: &GenerationConfig,
        style: StyleConfig,
    ) -> Result<Self, ControllerError> {
        let analyzer = ContentAnalyzer::with_lexicon(&persona);
        let engine = StyleEngine::new(Arc::clone(&persona), style, generation.history_capacity);
        Self::with_components(persona, generator, analyzer, engine, generation)
    }

    /// Controller from pre-built components (seeded RNGs, custom scorers).
    ///
    /// # Errors
    ///
    /// Same as [`GenerationController::new`].
    pub fn with_components(
        persona: Arc<PersonaConfig>,
        generator: Arc<dyn TextGenerator>,
        analyzer: ContentAnalyzer,
        style: StyleEngine,
        generation: &GenerationConfig,
    ) -> Result<Self, ControllerError> {
        let normalizer = TextNormalizer::new(&persona.canonical, generation.terminal_mark)?;
        let fallbacks = FallbackPool::build(&persona, &normalizer)?;
        let prompt = PromptBuilder::new(Arc::clone(&persona), generation.mode);

        Ok(Self {
            persona,
            generator,
            analyzer,
            normalizer,
            prompt,
            style: Mutex::new(style),
            fallbacks,
            max_attempts: generation.max_attempts.max(1),
        })
    }

    /// Active mode.
    pub fn mode(&self) -> PostMode {
        self.prompt.mode()
    }

    /// Switch between standard and summary operation.
    pub fn set_mode(&mut self, mode: PostMode) {
        self.prompt.set_mode(mode);
    }

    /// Maximum generator invocations per call.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Length bounds for the active mode.
    pub fn bounds(&self) -> LengthBounds {
        self.persona.bounds(self.mode())
    }

    /// The normalizer used on generator output.
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Copy of the current decoration history.
    pub fn style_history(&self) -> StyleHistory {
        self.style().history().clone()
    }

    /// Classify a topic without generating.
    pub fn analyze(&self, topic: &str) -> Analysis {
        self.analyzer.analyze(topic)
    }

    /// Produce a post for `topic`.
    ///
    /// Makes at most `max_attempts` generator calls and always returns a
    /// postable string for a non-empty topic.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::EmptyTopic`] for an empty or whitespace-only
    /// topic, without invoking the generator.
    pub async fn generate_post(&self, topic: &str) -> Result<Post, GenerationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerationError::EmptyTopic);
        }

        let analysis = self.analyzer.analyze(topic);
        let bounds = self.bounds();
        debug!(
            category = %analysis.category,
            sentiment = %analysis.sentiment,
            mode = %self.mode(),
            "topic classified"
        );

        for number in 1..=self.max_attempts {
            let opener = self.style().select_opener();
            let mut attempt = GenerationAttempt {
                number,
                topic: topic.to_owned(),
                category: analysis.category,
                sentiment: analysis.sentiment,
                prompt: self
                    .prompt
                    .build(topic, &opener, analysis.sentiment, analysis.category),
                raw: None,
                normalized: None,
                styled: None,
            };

            match self.run_attempt(&mut attempt, &opener, bounds).await {
                Ok(text) => {
                    info!(
                        attempt = number,
                        category = %analysis.category,
                        len = text.chars().count(),
                        "post accepted"
                    );
                    return Ok(Post {
                        text,
                        origin: PostOrigin::Generated { attempt: number },
                    });
                }
                Err(AttemptFailure::Generator(e)) => {
                    warn!(attempt = number, error = %e, "generator attempt failed");
                    debug!(?attempt, "rejected attempt");
                }
                Err(AttemptFailure::Invalid(reason)) => {
                    debug!(attempt = number, %reason, ?attempt, "attempt failed validation");
                }
            }
        }

        let text = self.pick_fallback();
        warn!(
            attempts = self.max_attempts,
            category = %analysis.category,
            "attempts exhausted, using fallback post"
        );
        Ok(Post {
            text,
            origin: PostOrigin::Fallback,
        })
    }

    async fn run_attempt(
        &self,
        attempt: &mut GenerationAttempt,
        opener: &str,
        bounds: LengthBounds,
    ) -> Result<String, AttemptFailure> {
        let raw = self.generator.generate(&attempt.prompt).await?;
        let mut text = self.normalizer.normalize(&raw);
        attempt.raw = Some(raw);
        if text.is_empty() {
            return Err(ValidationFailure::Empty.into());
        }

        if text.chars().count() > bounds.max {
            text = self.normalizer.truncate(&text, bounds.max);
        }
        attempt.normalized = Some(text.clone());

        let styled = self
            .style()
            .decorate(&text, Some(opener), attempt.category, bounds.max);
        attempt.styled = Some(styled.clone());

        validator::validate(&styled, bounds)?;
        Ok(styled)
    }

    fn pick_fallback(&self) -> String {
        let pool = self.fallbacks.for_mode(self.mode());
        pool.choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }

    /// Lock the style engine. A poisoned lock only means a panic elsewhere
    /// mid-selection; the history is still usable.
    fn style(&self) -> MutexGuard<'_, StyleEngine> {
        self.style.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
