//! Deterministic cleanup of raw model output.
//!
//! The pipeline runs five stages in a fixed order; later stages assume the
//! earlier ones already ran:
//!
//! 1. payload extraction (quoted span, scaffold marker, first line, cutoffs)
//! 2. brand-term canonicalization (persona rules, in list order)
//! 3. artifact removal (hashtags, mentions, bracketed notes, decoration)
//! 4. whitespace and punctuation repair
//! 5. terminal punctuation enforcement
//!
//! Later stages can expose new matches for earlier ones (a stripped `_`
//! next to a bare ticker, a removed quote in front of a cutoff phrase), so
//! [`TextNormalizer::normalize`] repeats the pipeline until the text stops
//! changing. Its output is therefore a fixed point: feeding it back in
//! returns the same string.
//!
//! URIs (`https://…`, `mailto:…`, `ipfs:…`) pass through stages 2 to 4
//! untouched.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::persona::CanonicalRule;

/// Marker the prompt ends with and the model is expected to continue from.
pub const SCAFFOLD_MARKER: &str = "Tweet:";

/// Punctuation appended when the text lacks a terminal mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalMark {
    /// Append `!`.
    #[default]
    Exclaim,
    /// Append `.`.
    Period,
}

impl TerminalMark {
    /// The punctuation character.
    pub fn as_char(self) -> char {
        match self {
            Self::Exclaim => '!',
            Self::Period => '.',
        }
    }
}

/// Errors raised while compiling normalizer patterns.
#[derive(Debug, thiserror::Error)]
pub enum NormalizerError {
    /// A pattern failed to compile.
    #[error("invalid normalizer pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },
}

fn compile(pattern: &str) -> Result<Regex, NormalizerError> {
    Regex::new(pattern).map_err(|source| NormalizerError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

/// Characters stripped from the start of a post.
const LEADING_JUNK: &[char] = &[
    ',', '.', ';', ':', '!', '?', '-', '\u{2013}', '\u{2014}', '>', '\u{2022}', '*',
];

/// Upper bound on extra pipeline passes in [`TextNormalizer::normalize`].
const MAX_EXTRA_PASSES: usize = 8;

/// Characters stripped from the end before terminal enforcement.
const TRAILING_JUNK: &[char] = &[',', ';', ':', '-', '\u{2013}', '\u{2014}'];

#[derive(Debug, Clone)]
struct Patterns {
    quoted: Regex,
    scaffold: Regex,
    uri: Regex,
    cutoff: Regex,
    hashtag: Regex,
    mention: Regex,
    bracketed: Regex,
    stray_bracket: Regex,
    paren_note: Regex,
    quote_chars: Regex,
    decoration: Regex,
    pictograph: Regex,
    list_marker: Regex,
    whitespace: Regex,
    space_before_mark: Regex,
    repeated_terminal: Regex,
    repeated_separator: Regex,
    missing_space_after_mark: Regex,
    missing_space_after_period: Regex,
}

impl Patterns {
    fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            quoted: compile(r#""([^"]+)"|\u{201C}([^\u{201D}]+)\u{201D}"#)?,
            scaffold: compile(r"(?i)\b(?:tweet|post)\s*:")?,
            uri: compile(r"(?i)\b(?:(?:https?|ftp|wss?)://|(?:mailto|ipfs|ipns|magnet):)\S+")?,
            cutoff: compile(
                r"(?i)\bnote\s*:|\byour response\b|\bexplanation\s*:|\bcharacter count\b|\(\s*note\b",
            )?,
            hashtag: compile(r"#[\p{L}\p{N}_]*")?,
            mention: compile(r"@[\p{L}\p{N}_]*")?,
            bracketed: compile(r"\[[^\[\]]*\]")?,
            stray_bracket: compile(r"[\[\]]")?,
            paren_note: compile(
                r"(?i)\(\s*(?:note|edit|meta|source|disclaimer)\b[^()]*\)|\([^()]*\bcharacters?\s*\)",
            )?,
            quote_chars: compile("[\"\u{201C}\u{201D}]")?,
            decoration: compile(r"[*_~`|\u{2022}\u{25BA}\u{25AA}\u{25A0}\u{2192}]+|={2,}|-{2,}|\+{2,}")?,
            pictograph: compile(
                r"[\p{Extended_Pictographic}\u{FE0F}\u{200D}\u{20E3}\u{1F1E6}-\u{1F1FF}\u{1F3FB}-\u{1F3FF}]+",
            )?,
            list_marker: compile(r"^\d{1,3}\s*[.)]\s+")?,
            whitespace: compile(r"\s+")?,
            space_before_mark: compile(r"\s+([,.!?;:])")?,
            repeated_terminal: compile(r"([!?.])[!?.]+")?,
            repeated_separator: compile(r"([,;:])[,;:]+")?,
            missing_space_after_mark: compile(r"([!?,;:])(\p{L})")?,
            missing_space_after_period: compile(r"(\p{Ll}{2,})\.(\p{Lu})")?,
        })
    }
}

/// Turns arbitrary model output into one clean, sentence-like post.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    canonical: Vec<(Regex, String)>,
    terminal: TerminalMark,
    patterns: Patterns,
}

impl TextNormalizer {
    /// Compile a normalizer for the given canonicalization rules.
    ///
    /// Rules are applied in slice order, so compound forms must come before
    /// the generic forms they contain.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizerError::InvalidPattern`] if a rule does not compile.
    pub fn new(rules: &[CanonicalRule], terminal: TerminalMark) -> Result<Self, NormalizerError> {
        let canonical = rules
            .iter()
            .map(|rule| Ok((compile(&rule.pattern)?, rule.replacement.clone())))
            .collect::<Result<Vec<_>, NormalizerError>>()?;
        Ok(Self {
            canonical,
            terminal,
            patterns: Patterns::new()?,
        })
    }

    /// Mark appended by terminal enforcement.
    pub fn terminal_mark(&self) -> TerminalMark {
        self.terminal
    }

    /// Run the full pipeline until the output is stable.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.normalize_once(raw);
        for _ in 0..MAX_EXTRA_PASSES {
            let next = self.normalize_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn normalize_once(&self, raw: &str) -> String {
        let payload = self.extract_payload(raw);
        let canonical = self.canonicalize(&payload);
        let stripped = self.strip_artifacts(&canonical);
        let repaired = self.repair_punctuation(&stripped);
        self.enforce_terminal(&repaired)
    }

    /// Apply `f` to the text between URIs, copying the URIs verbatim.
    fn outside_uris(&self, text: &str, f: impl Fn(&str) -> String) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.patterns.uri.find_iter(text) {
            out.push_str(&f(&text[last..m.start()]));
            out.push_str(m.as_str());
            last = m.end();
        }
        out.push_str(&f(&text[last..]));
        out
    }

    /// Stage 1: pull the post out of generator scaffolding.
    ///
    /// The quoted span (or the whole text) is cut after its last scaffold
    /// marker, so a quoted `"New post: …"` loses its label too.
    pub fn extract_payload(&self, raw: &str) -> String {
        let p = &self.patterns;

        let span = match p.quoted.captures(raw) {
            Some(caps) => caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str()),
            None => raw,
        };
        let span = match p.scaffold.find_iter(span).last() {
            Some(last) => &span[last.end()..],
            None => span,
        };

        let line = span.trim_start().lines().next().unwrap_or("");
        let line = match p.cutoff.find(line) {
            Some(m) => &line[..m.start()],
            None => line,
        };
        line.trim().to_owned()
    }

    /// Stage 2: fold brand-term variants onto their canonical spelling.
    pub fn canonicalize(&self, text: &str) -> String {
        self.outside_uris(text, |segment| {
            let mut out = segment.to_owned();
            for (pattern, replacement) in &self.canonical {
                out = pattern
                    .replace_all(&out, replacement.as_str())
                    .into_owned();
            }
            out
        })
    }

    /// Stage 3: remove hashtags, mentions, bracketed notes and decoration.
    pub fn strip_artifacts(&self, text: &str) -> String {
        let p = &self.patterns;

        // Folded here so a leading ellipsis is trimmed with the other junk.
        let text = text.replace('\u{2026}', ".");
        let out = self.outside_uris(&text, |segment| {
            let mut out = p.hashtag.replace_all(segment, " ").into_owned();
            out = p.mention.replace_all(&out, " ").into_owned();
            while p.bracketed.is_match(&out) {
                out = p.bracketed.replace_all(&out, " ").into_owned();
            }
            out = p.stray_bracket.replace_all(&out, " ").into_owned();
            out = p.paren_note.replace_all(&out, " ").into_owned();
            out = p.quote_chars.replace_all(&out, " ").into_owned();
            out = p.decoration.replace_all(&out, " ").into_owned();
            p.pictograph.replace_all(&out, " ").into_owned()
        });

        // List markers and stray leading punctuation, until neither applies.
        let mut rest = out.as_str();
        loop {
            let trimmed = rest.trim_start().trim_start_matches(LEADING_JUNK);
            let trimmed = match p.list_marker.find(trimmed) {
                Some(m) => &trimmed[m.end()..],
                None => trimmed,
            };
            if trimmed.len() == rest.len() {
                break;
            }
            rest = trimmed;
        }
        rest.trim_end().to_owned()
    }

    /// Stage 4: collapse whitespace and fix spacing around punctuation.
    pub fn repair_punctuation(&self, text: &str) -> String {
        let p = &self.patterns;

        let out = p.whitespace.replace_all(text, " ");
        let out = p.space_before_mark.replace_all(out.trim(), "$1");
        let out = self.outside_uris(&out, |segment| {
            let s = p.repeated_terminal.replace_all(segment, "$1");
            let s = p.repeated_separator.replace_all(&s, "$1");
            let s = p.missing_space_after_mark.replace_all(&s, "$1 $2");
            p.missing_space_after_period
                .replace_all(&s, "$1. $2")
                .into_owned()
        });
        out.trim().to_owned()
    }

    /// Stage 5: make sure the text ends in `.`, `!` or `?`.
    ///
    /// Trailing separators are dropped first. Empty input stays empty.
    pub fn enforce_terminal(&self, text: &str) -> String {
        let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() || TRAILING_JUNK.contains(&c));
        if trimmed.is_empty() {
            return String::new();
        }
        let mut out = trimmed.to_owned();
        if !out.ends_with(['.', '!', '?']) {
            out.push(self.terminal.as_char());
        }
        out
    }

    /// Hard-truncate to at most `max` characters and re-apply terminal
    /// punctuation.
    ///
    /// Cuts at the last word boundary when one falls in the final quarter of
    /// the budget, otherwise mid-word.
    pub fn truncate(&self, text: &str, max: usize) -> String {
        if text.chars().count() <= max {
            return text.to_owned();
        }
        // One character is reserved for the terminal mark.
        let budget = max.saturating_sub(1);
        let head: String = text.chars().take(budget).collect();
        let floor = budget.saturating_sub(budget / 4);
        let cut = match head.rfind(' ') {
            Some(i) if head[..i].chars().count() >= floor => &head[..i],
            _ => head.as_str(),
        };
        self.enforce_terminal(cut)
    }
}
