//! Decoration: opener, emoji and hashtag selection with anti-repetition.
//!
//! Selection prefers pool items absent from the channel's recent history and
//! falls back to the whole pool once history covers it, so a draw never
//! fails. Decoration is gated on remaining character budget and skipped
//! entirely when the text already carries a personality marker.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tracing::debug;

use crate::config::StyleConfig;
use crate::persona::{Category, PersonaConfig};

pub mod history;

pub use history::{BoundedHistory, StyleHistory, DEFAULT_HISTORY_CAPACITY};

/// Where an emoji lands relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmojiPlacement {
    /// Before the text.
    Prefix,
    /// After the text.
    Suffix,
    /// Not placed. The draw is still recorded in history.
    Omitted,
}

/// Pick an item from `pool`, avoiding entries in `history` when possible.
///
/// The chosen item is pushed into `history`. Returns `None` only when the
/// pool itself is empty.
pub fn select<R: Rng + ?Sized>(
    pool: &[String],
    history: &mut BoundedHistory,
    rng: &mut R,
) -> Option<String> {
    let fresh: Vec<&String> = pool.iter().filter(|item| !history.contains(item)).collect();
    let chosen = match fresh.choose(rng) {
        Some(item) => (*item).clone(),
        None => pool.choose(rng)?.clone(),
    };
    history.push(chosen.clone());
    Some(chosen)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Attaches persona decoration to normalized text.
#[derive(Debug)]
pub struct StyleEngine {
    persona: Arc<PersonaConfig>,
    settings: StyleConfig,
    markers: Option<Regex>,
    history: StyleHistory,
    rng: StdRng,
}

impl StyleEngine {
    /// Engine with an entropy-seeded RNG.
    pub fn new(persona: Arc<PersonaConfig>, settings: StyleConfig, history_capacity: usize) -> Self {
        Self::with_rng(
            persona,
            settings,
            history_capacity,
            StdRng::from_entropy(),
        )
    }

    /// Engine with a caller-supplied RNG (seed it for reproducible tests).
    pub fn with_rng(
        persona: Arc<PersonaConfig>,
        settings: StyleConfig,
        history_capacity: usize,
        rng: StdRng,
    ) -> Self {
        let markers = marker_pattern(&persona.markers);
        Self {
            persona,
            settings,
            markers,
            history: StyleHistory::new(history_capacity),
            rng,
        }
    }

    /// Recent selections per channel.
    pub fn history(&self) -> &StyleHistory {
        &self.history
    }

    /// Whether `text` already contains a personality marker.
    pub fn has_marker(&self, text: &str) -> bool {
        self.markers.as_ref().is_some_and(|m| m.is_match(text))
    }

    /// Draw an opener for the next prompt and record it.
    pub fn select_opener(&mut self) -> String {
        select(&self.persona.openers, &mut self.history.openers, &mut self.rng).unwrap_or_default()
    }

    /// Map a uniform draw in `[0, 1)` onto an emoji placement.
    pub fn emoji_placement(&self, draw: f64) -> EmojiPlacement {
        if draw < self.settings.emoji_prefix_below {
            EmojiPlacement::Prefix
        } else if draw < self.settings.emoji_suffix_below {
            EmojiPlacement::Suffix
        } else {
            EmojiPlacement::Omitted
        }
    }

    /// Decorate `text` without exceeding `max_len` characters.
    ///
    /// Adds at most one opener, one emoji and one hashtag, in that order.
    /// Anything that does not fit is skipped silently.
    pub fn decorate(
        &mut self,
        text: &str,
        opener: Option<&str>,
        category: Category,
        max_len: usize,
    ) -> String {
        if self.has_marker(text) {
            debug!(%category, "personality marker present, skipping decoration");
            return text.to_owned();
        }

        let mut out = text.to_owned();

        if let Some(opener) = opener.map(str::trim).filter(|o| !o.is_empty()) {
            let already = out.to_lowercase().starts_with(&opener.to_lowercase());
            let needed = char_len(opener).saturating_add(1);
            if !already && max_len.saturating_sub(char_len(&out)) >= needed {
                out = format!("{opener} {out}");
            }
        }

        let remaining = max_len.saturating_sub(char_len(&out));
        if remaining > self.settings.emoji_margin {
            let pool = self.persona.emojis.get(category);
            if let Some(emoji) = select(pool, &mut self.history.emojis, &mut self.rng) {
                let draw: f64 = self.rng.gen();
                let fits = char_len(&emoji) < remaining;
                match self.emoji_placement(draw) {
                    EmojiPlacement::Prefix if fits => out = format!("{emoji} {out}"),
                    EmojiPlacement::Suffix if fits => out = format!("{out} {emoji}"),
                    _ => {}
                }
            }
        }

        let remaining = max_len.saturating_sub(char_len(&out));
        if remaining > self.settings.hashtag_margin {
            let pool = self.persona.hashtags.get(category);
            if let Some(tag) = select(pool, &mut self.history.hashtags, &mut self.rng) {
                if char_len(&tag) < remaining {
                    out = format!("{out} {tag}");
                }
            }
        }

        out
    }
}

/// Word-bounded, case-insensitive alternation over the persona markers.
fn marker_pattern(markers: &[String]) -> Option<Regex> {
    let escaped: Vec<String> = markers
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", escaped.join("|"))).ok()
}
