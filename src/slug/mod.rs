//! Slug derivation for human-entered titles.
//!
//! A slug is the URL-safe form of a title: lowercase ASCII letters and digits,
//! code points from an allow-listed set of non-Latin scripts, and single hyphens
//! between runs of those. No leading, trailing or doubled hyphens.
//!
//! Which non-Latin scripts survive is a [`ScriptSet`] choice rather than a fixed
//! fact. The console historically shipped both an extended variant (CJK, kana,
//! Arabic) and a Latin-only one; [`ScriptSet::default`] is the extended set.

mod unique;

pub use unique::*;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Letters that canonical decomposition leaves alone but that should still fold
/// to a plain Latin letter.
const SUBSTITUTIONS: &[(char, char)] = &[('đ', 'd'), ('Đ', 'D')];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty: title has no characters that can appear in a slug")]
    Empty,
}

/// A non-Latin script whose code points may appear in a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// CJK unified ideographs (U+4E00..=U+9FFF).
    Cjk,
    /// Hiragana and Katakana (U+3040..=U+30FF).
    Kana,
    /// The Arabic block (U+0600..=U+06FF).
    Arabic,
}

impl Script {
    pub const ALL: [Script; 3] = [Script::Cjk, Script::Kana, Script::Arabic];

    fn contains(self, c: char) -> bool {
        match self {
            Self::Cjk => ('\u{4e00}'..='\u{9fff}').contains(&c),
            Self::Kana => ('\u{3040}'..='\u{30ff}').contains(&c),
            Self::Arabic => ('\u{0600}'..='\u{06ff}').contains(&c),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cjk => "cjk",
            Self::Kana => "kana",
            Self::Arabic => "arabic",
        }
    }
}

impl FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cjk" => Ok(Self::Cjk),
            "kana" => Ok(Self::Kana),
            "arabic" => Ok(Self::Arabic),
            other => Err(format!("unknown script: {}", other)),
        }
    }
}

/// The set of non-Latin scripts allowed through slug normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSet {
    cjk: bool,
    kana: bool,
    arabic: bool,
}

impl ScriptSet {
    /// ASCII letters and digits only.
    pub const LATIN_ONLY: ScriptSet = ScriptSet {
        cjk: false,
        kana: false,
        arabic: false,
    };

    /// CJK ideographs, kana and Arabic in addition to ASCII.
    pub const EXTENDED: ScriptSet = ScriptSet {
        cjk: true,
        kana: true,
        arabic: true,
    };

    pub fn with(mut self, script: Script) -> Self {
        match script {
            Script::Cjk => self.cjk = true,
            Script::Kana => self.kana = true,
            Script::Arabic => self.arabic = true,
        }
        self
    }

    pub fn includes(&self, script: Script) -> bool {
        match script {
            Script::Cjk => self.cjk,
            Script::Kana => self.kana,
            Script::Arabic => self.arabic,
        }
    }

    /// Whether `c` may appear in a slug (hyphens aside).
    pub fn allows(&self, c: char) -> bool {
        c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || Script::ALL
                .iter()
                .any(|script| self.includes(*script) && script.contains(c))
    }
}

impl Default for ScriptSet {
    fn default() -> Self {
        Self::EXTENDED
    }
}

/// Parses `extended`, `latin`, or a comma separated list of scripts
/// (`cjk,kana`).
impl FromStr for ScriptSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" | "all" => Ok(Self::EXTENDED),
            "latin" | "latin-only" | "" => Ok(Self::LATIN_ONLY),
            list => list
                .split(',')
                .map(str::parse::<Script>)
                .try_fold(Self::LATIN_ONLY, |set, script| Ok(set.with(script?))),
        }
    }
}

impl fmt::Display for ScriptSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::LATIN_ONLY {
            return f.write_str("latin");
        }
        let names: Vec<&str> = Script::ALL
            .iter()
            .filter(|s| self.includes(**s))
            .map(Script::as_str)
            .collect();
        f.write_str(&names.join(","))
    }
}

/// Turns free text into a slug.
///
/// Generation is pure and idempotent: feeding a slug back in returns it
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlugGenerator {
    scripts: ScriptSet,
}

impl SlugGenerator {
    pub fn new(scripts: ScriptSet) -> Self {
        Self { scripts }
    }

    pub fn scripts(&self) -> ScriptSet {
        self.scripts
    }

    /// Derive a slug from `title`.
    ///
    /// Returns an empty string when nothing in the title survives
    /// normalization; callers decide whether that is an error
    /// (see [`SlugGenerator::require`]).
    pub fn generate(&self, title: &str) -> String {
        // Decompose, drop combining diacritics, fold the letters that have no
        // decomposition, then lowercase.
        let folded: String = title
            .nfd()
            .filter(|c| !is_combining_diacritic(*c))
            .map(substitute)
            .collect();
        let lowered = folded.to_lowercase();

        // Every run of disallowed characters becomes one hyphen. A run at
        // either end is dropped instead, so the result never starts or ends
        // with a hyphen and never holds two in a row.
        let mut slug = String::with_capacity(lowered.len());
        let mut pending_hyphen = false;
        for c in lowered.chars() {
            if self.scripts.allows(c) {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            } else {
                pending_hyphen = true;
            }
        }
        slug
    }

    /// Like [`SlugGenerator::generate`], but an empty result is a validation error.
    pub fn require(&self, title: &str) -> Result<String, SlugError> {
        let slug = self.generate(title);
        if slug.is_empty() {
            Err(SlugError::Empty)
        } else {
            Ok(slug)
        }
    }

    /// Whether `value` is already a well-formed, non-empty slug for this script set.
    pub fn is_valid(&self, value: &str) -> bool {
        is_valid_slug(value, self.scripts)
    }
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn substitute(c: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Derive a slug with the default (extended) script set.
pub fn generate_slug(title: &str) -> String {
    SlugGenerator::default().generate(title)
}

/// Derive a slug with the default script set, rejecting empty results.
pub fn require_slug(title: &str) -> Result<String, SlugError> {
    SlugGenerator::default().require(title)
}

/// Return `true` when `value` is a non-empty slug: allowed characters and
/// single interior hyphens only.
pub fn is_valid_slug(value: &str, scripts: ScriptSet) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value.chars().all(|c| c == '-' || scripts.allows(c))
}
