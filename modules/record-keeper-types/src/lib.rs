//! Shared types for the record keeper service and its RPC clients.

use serde::{Deserialize, Serialize};

// =====================================================
// Slugs
// =====================================================

/// What happens to a single (already lower-cased) title character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharRule {
    Remove,
    Replace(char),
}

/// Characters that do not pass through a slug unchanged. Anything not
/// listed here is kept as-is after case folding.
static CHAR_RULES: [(char, CharRule); 13] = [
    (' ', CharRule::Replace('-')),
    ('?', CharRule::Remove),
    ('&', CharRule::Remove),
    (':', CharRule::Remove),
    ('!', CharRule::Remove),
    ('@', CharRule::Remove),
    ('#', CharRule::Remove),
    ('$', CharRule::Remove),
    ('%', CharRule::Remove),
    ('^', CharRule::Remove),
    ('*', CharRule::Remove),
    ('(', CharRule::Remove),
    (')', CharRule::Remove),
];

fn rule_for(c: char) -> Option<CharRule> {
    CHAR_RULES
        .iter()
        .find(|(key, _)| *key == c)
        .map(|(_, rule)| *rule)
}

/// Characters that never survive into a slug.
pub fn stripped_chars() -> impl Iterator<Item = char> {
    CHAR_RULES
        .iter()
        .filter(|(_, rule)| *rule == CharRule::Remove)
        .map(|(c, _)| *c)
}

/// True for `.`, `..` and longer runs of dots. URL clients fold such path
/// segments away, so they cannot identify a record.
pub fn is_dot_segment(slug: &str) -> bool {
    !slug.is_empty() && slug.chars().all(|c| c == '.')
}

/// Derive the storage key / URL segment for a record title.
///
/// Lower-cases the title, turns every space into one hyphen (runs of spaces
/// are not collapsed) and drops `? & : ! @ # $ % ^ * ( )`. Every other
/// character, including `.`, `,`, `=` and non-ASCII letters, is kept.
///
/// Case folding is per character, so a final `Σ` becomes `σ` rather than
/// the word-final `ς` that `str::to_lowercase` would pick.
///
/// Distinct titles may map to the same slug, and a title made only of
/// stripped characters yields an empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        match rule_for(c) {
            Some(CharRule::Remove) => {}
            Some(CharRule::Replace(with)) => slug.push(with),
            None => slug.push(c),
        }
    }
    slug
}

// =====================================================
// Domain Types
// =====================================================

/// A titled text record. Persisted as `{"Title": ..., "Content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub title: String,
    pub content: String,
}

impl Record {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            title: self.title.clone(),
            slug: self.slug(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub title: String,
    pub slug: String,
}

// =====================================================
// Form Types
// =====================================================

/// Body of the create and save forms. Missing fields read as empty text.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SaveRecordForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<SaveRecordForm> for Record {
    fn from(form: SaveRecordForm) -> Self {
        Record::new(form.title, form.content)
    }
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub record_count: usize,
    pub storage_dir: String,
}
