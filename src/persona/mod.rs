//! Persona configuration: tone, per-category tables and decoration pools.
//!
//! A persona is pure data. Swapping personalities is a TOML change, never a
//! new code path. Every per-category table is a [`CategoryMap`], which refuses
//! to load unless all [`Category`] variants are present, so lookups after
//! construction cannot miss.
//!
//! The built-in persona lives in `default.toml` next to this file and is
//! embedded at compile time.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Built-in persona definition.
const BUILTIN_PERSONA: &str = include_str!("default.toml");

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed topic classification used to select tone and decoration pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Prices, charts, trading.
    Market,
    /// Protocol engineering, validators, tooling.
    Technical,
    /// DeFi: staking, liquidity, lending.
    EcosystemFinance,
    /// NFTs and digital collectibles.
    Collectibles,
    /// Events, meetups, people.
    Community,
    /// Universal fallback when nothing else matches.
    General,
}

impl Category {
    /// All categories in classification order. `General` is always last.
    pub const ALL: [Category; 6] = [
        Category::Market,
        Category::Technical,
        Category::EcosystemFinance,
        Category::Collectibles,
        Category::Community,
        Category::General,
    ];

    /// Stable string key used in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Technical => "technical",
            Self::EcosystemFinance => "ecosystem_finance",
            Self::Collectibles => "collectibles",
            Self::Community => "community",
            Self::General => "general",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Market => 0,
            Self::Technical => 1,
            Self::EcosystemFinance => 2,
            Self::Collectibles => 3,
            Self::Community => 4,
            Self::General => 5,
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Total mapping from every [`Category`] to a value.
///
/// Deserializes from a table keyed by [`Category::key`]. Loading fails if any
/// category is missing, so [`CategoryMap::get`] is infallible.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<String, T>")]
pub struct CategoryMap<T> {
    entries: Vec<T>,
}

impl<T> CategoryMap<T> {
    /// Build a map by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            entries: Category::ALL.iter().map(|c| f(*c)).collect(),
        }
    }

    /// Value for `category`.
    pub fn get(&self, category: Category) -> &T {
        &self.entries[category.index()]
    }

    /// Iterate `(category, value)` pairs in classification order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.entries.iter())
    }
}

impl<T> TryFrom<HashMap<String, T>> for CategoryMap<T> {
    type Error = PersonaError;

    fn try_from(raw: HashMap<String, T>) -> Result<Self, Self::Error> {
        let mut map = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let category = key
                .parse::<Category>()
                .map_err(|_| PersonaError::UnknownCategory { key })?;
            map.insert(category, value);
        }
        let mut entries = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let value = map
                .remove(&category)
                .ok_or(PersonaError::MissingCategory { category })?;
            entries.push(value);
        }
        Ok(Self { entries })
    }
}

// ---------------------------------------------------------------------------
// Modes and bounds
// ---------------------------------------------------------------------------

/// Operating mode, selected by the external summarizing flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostMode {
    /// Short standalone post.
    #[default]
    Standard,
    /// Longer, summarizing post.
    Summary,
}

impl fmt::Display for PostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Summary => f.write_str("summary"),
        }
    }
}

impl std::str::FromStr for PostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "summary" => Ok(Self::Summary),
            other => Err(format!("unknown post mode '{other}'")),
        }
    }
}

/// Inclusive character-count bounds for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    /// Minimum length in characters.
    pub min: usize,
    /// Maximum length in characters.
    pub max: usize,
}

impl LengthBounds {
    /// Whether `len` lies within the bounds.
    pub fn contains(self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Tone and length bounds for one operating mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeProfile {
    /// Mode-specific tone instructions.
    pub tone: String,
    /// Minimum post length in characters.
    pub min_length: usize,
    /// Maximum post length in characters.
    pub max_length: usize,
}

/// Per-mode profiles.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeTable {
    /// Standard post profile.
    pub standard: ModeProfile,
    /// Summary post profile.
    pub summary: ModeProfile,
}

/// Sentiment guidance strings. Missing entries resolve to `default`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentimentGuidance {
    /// Guidance for positive topics.
    pub positive: Option<String>,
    /// Guidance for neutral topics.
    pub neutral: Option<String>,
    /// Guidance for negative topics.
    pub negative: Option<String>,
    /// Fallback guidance.
    pub default: String,
}

/// A single brand-term canonicalization rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalRule {
    /// Regular expression (regex crate syntax).
    pub pattern: String,
    /// Replacement, `$1`-style group references allowed.
    pub replacement: String,
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a persona.
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    /// Persona file could not be read.
    #[error("failed to read persona at {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Persona TOML could not be parsed.
    #[error("failed to parse persona: {0}")]
    Parse(#[from] toml::de::Error),
    /// A per-category table lacks an entry.
    #[error("missing entry for category '{category}'")]
    MissingCategory {
        /// The absent category.
        category: Category,
    },
    /// A per-category table has a key that names no category.
    #[error("unknown category key '{key}'")]
    UnknownCategory {
        /// The unrecognized key.
        key: String,
    },
    /// A decoration pool that must be non-empty is empty.
    #[error("pool '{pool}' must not be empty")]
    EmptyPool {
        /// Pool name, e.g. `emojis.market`.
        pool: String,
    },
    /// Mode length bounds are unusable.
    #[error("invalid length bounds for {mode} mode: min {min}, max {max}")]
    InvalidBounds {
        /// Offending mode.
        mode: PostMode,
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A canonicalization pattern does not compile.
    #[error("invalid canonical pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },
}

/// Static persona configuration. Read-only after load.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Display name.
    pub name: String,
    /// Base tone, included in every prompt.
    pub tone: String,
    /// Standard and summary mode profiles.
    pub modes: ModeTable,
    /// Category guidance strings.
    pub guidance: CategoryMap<String>,
    /// Sentiment guidance strings.
    pub sentiment_guidance: SentimentGuidance,
    /// Classification keywords. `general` is usually empty.
    pub keywords: CategoryMap<Vec<String>>,
    /// Hook ideas surfaced in prompts.
    pub hooks: CategoryMap<Vec<String>>,
    /// Emoji pools.
    pub emojis: CategoryMap<Vec<String>>,
    /// Hashtag pools.
    pub hashtags: CategoryMap<Vec<String>>,
    /// Opener pool.
    pub openers: Vec<String>,
    /// Personality markers; text containing one is left undecorated.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Curated fallback posts.
    pub fallbacks: Vec<String>,
    /// Ordered canonicalization rules, specific before generic.
    #[serde(default)]
    pub canonical: Vec<CanonicalRule>,
}

impl PersonaConfig {
    /// Load the persona embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded definition fails validation.
    pub fn builtin() -> Result<Self, PersonaError> {
        Self::from_toml_str(BUILTIN_PERSONA)
    }

    /// Load and validate a persona from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError`] on read, parse, or validation failure.
    pub fn load(path: &Path) -> Result<Self, PersonaError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PersonaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a persona from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError`] on parse or validation failure.
    pub fn from_toml_str(contents: &str) -> Result<Self, PersonaError> {
        let persona: PersonaConfig = toml::from_str(contents)?;
        persona.validate()?;
        Ok(persona)
    }

    /// Check invariants not expressible in the type system.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), PersonaError> {
        if self.openers.is_empty() {
            return Err(PersonaError::EmptyPool {
                pool: "openers".to_owned(),
            });
        }
        if self.fallbacks.is_empty() {
            return Err(PersonaError::EmptyPool {
                pool: "fallbacks".to_owned(),
            });
        }
        for (table, map) in [("emojis", &self.emojis), ("hashtags", &self.hashtags)] {
            for (category, pool) in map.iter() {
                if pool.is_empty() {
                    return Err(PersonaError::EmptyPool {
                        pool: format!("{table}.{category}"),
                    });
                }
            }
        }
        for mode in [PostMode::Standard, PostMode::Summary] {
            let bounds = self.bounds(mode);
            if bounds.min == 0 || bounds.min > bounds.max {
                return Err(PersonaError::InvalidBounds {
                    mode,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        for rule in &self.canonical {
            Regex::new(&rule.pattern).map_err(|source| PersonaError::InvalidPattern {
                pattern: rule.pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn profile(&self, mode: PostMode) -> &ModeProfile {
        match mode {
            PostMode::Standard => &self.modes.standard,
            PostMode::Summary => &self.modes.summary,
        }
    }

    /// Length bounds for `mode`.
    pub fn bounds(&self, mode: PostMode) -> LengthBounds {
        let profile = self.profile(mode);
        LengthBounds {
            min: profile.min_length,
            max: profile.max_length,
        }
    }

    /// Tone text for `mode`.
    pub fn mode_tone(&self, mode: PostMode) -> &str {
        &self.profile(mode).tone
    }
}
