//! Restricted-word index and content moderation gate
//!
//! User-submitted text is gated against an administrator-managed word list
//! before it is persisted. Three severity classes:
//!
//! - **Ban**: the submission is rejected entirely
//! - **Warn**: the word is rewritten to its replacement before storage
//! - **Hide**: same as warn, kept distinct for reporting
//!
//! Matching is whole-word over the normalized form of the text, so a banned
//! token never matches as a substring of an unrelated word.

use crate::error::ServiceError;
use crate::orm::restricted_words::{self, Severity};
use crate::text::normalize;
use arc_swap::ArcSwap;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::HashMap;
use std::sync::Arc;

/// One entry of the compiled index
#[derive(Debug, Clone)]
pub struct IndexedWord {
    pub word: String,
    pub normalized: String,
    pub severity: Severity,
    pub replacement: String,
}

/// One matched word from a scan
#[derive(Debug, Clone)]
pub struct ScanMatch {
    pub word: String,
    pub severity: Severity,
    pub replacement: String,
}

/// Result of scanning a piece of text
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// True if any ban-class word matched
    pub has_banned: bool,
    pub matches: Vec<ScanMatch>,
}

impl ScanResult {
    /// The literal forms of all ban-class matches
    pub fn banned_words(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter(|m| m.severity.is_fatal())
            .map(|m| m.word.clone())
            .collect()
    }
}

/// Compiled restricted-word index, keyed by normalized form
#[derive(Debug, Default)]
pub struct WordIndex {
    by_normalized: HashMap<String, IndexedWord>,
}

impl WordIndex {
    pub fn from_entries(entries: Vec<restricted_words::Model>) -> Self {
        let by_normalized = entries
            .into_iter()
            .map(|model| {
                (
                    model.normalized.clone(),
                    IndexedWord {
                        word: model.word,
                        normalized: model.normalized,
                        severity: model.severity,
                        replacement: model.replacement,
                    },
                )
            })
            .collect();
        Self { by_normalized }
    }

    pub fn len(&self) -> usize {
        self.by_normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_normalized.is_empty()
    }

    pub fn lookup(&self, normalized_word: &str) -> Option<&IndexedWord> {
        self.by_normalized.get(normalized_word)
    }

    /// Scan text for restricted words.
    ///
    /// The text is normalized, split on whitespace, and each token has
    /// residual punctuation trimmed from its edges before an exact lookup.
    /// Each distinct word is reported once.
    pub fn scan(&self, text: &str) -> ScanResult {
        let mut result = ScanResult::default();
        if self.by_normalized.is_empty() {
            return result;
        }

        let normalized = normalize(text);
        let mut seen: Vec<&str> = Vec::new();
        for raw_token in normalized.split_whitespace() {
            let token = raw_token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() || seen.contains(&token) {
                continue;
            }
            if let Some(entry) = self.by_normalized.get(token) {
                result.has_banned |= entry.severity.is_fatal();
                result.matches.push(ScanMatch {
                    word: entry.word.clone(),
                    severity: entry.severity.clone(),
                    replacement: entry.replacement.clone(),
                });
            }
            seen.push(token);
        }
        result
    }

    /// Gate a submission's text fields before any write is committed.
    ///
    /// Fails with `ContentRejected` (enumerating the offending words) if any
    /// ban-class word is present in any field.
    pub fn validate_submission(&self, fields: &[&str]) -> Result<(), ServiceError> {
        let combined = fields.join(" ");
        let result = self.scan(&combined);
        if result.has_banned {
            return Err(ServiceError::ContentRejected {
                words: result.banned_words(),
            });
        }
        Ok(())
    }

    /// Rewrite warn/hide matches in text with their replacements.
    ///
    /// Every whole-word, case-insensitive occurrence of the matched literal
    /// is replaced. Ban-class words are left untouched; their presence
    /// already blocked persistence upstream. Idempotent.
    pub fn sanitize(&self, text: &str) -> String {
        let mut output = text.to_owned();
        for m in self.scan(text).matches {
            if m.severity.is_fatal() {
                continue;
            }
            let pattern = format!(r"(?i)\b{}\b", regex::escape(&m.word));
            match Regex::new(&pattern) {
                Ok(re) => {
                    // NoExpand: replacements are literal text, not templates
                    output = re
                        .replace_all(&output, regex::NoExpand(m.replacement.as_str()))
                        .into_owned();
                }
                Err(err) => {
                    log::error!(
                        "failed to compile replacement pattern for {:?}: {}",
                        m.word,
                        err
                    );
                }
            }
        }
        output
    }
}

/// Default replacement text: first character plus an asterisk for each
/// remaining character of the word.
pub fn default_replacement(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut out = String::new();
            out.push(first);
            out.extend(chars.map(|_| '*'));
            out
        }
    }
}

/// Process-global index snapshot. Read-heavy, write-rare; swapped wholesale
/// on reload so scans never observe a partially rebuilt index.
static INDEX: Lazy<ArcSwap<WordIndex>> = Lazy::new(|| ArcSwap::from_pointee(WordIndex::default()));

/// Current snapshot of the restricted-word index
pub fn current_index() -> Arc<WordIndex> {
    INDEX.load_full()
}

/// Replace the global index. Exposed for tests and the loaders below.
pub fn install_index(index: WordIndex) {
    INDEX.store(Arc::new(index));
}

/// Build the index from the database and install it globally
pub async fn load_index<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let entries = restricted_words::Entity::find().all(db).await?;
    let index = WordIndex::from_entries(entries);
    log::info!("Loaded {} restricted words", index.len());
    install_index(index);
    Ok(())
}

/// Rebuild the index after the word list changes
pub async fn reload_index<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    load_index(db).await
}

/// Insert a new restricted word, deriving its normalized form and default
/// replacement. The literal word must be unique.
pub async fn create_word<C: ConnectionTrait>(
    db: &C,
    word: &str,
    severity: Severity,
    replacement: Option<String>,
    created_by: Option<i32>,
) -> Result<restricted_words::Model, ServiceError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(ServiceError::Invalid("Word must not be empty".to_owned()));
    }

    let existing = restricted_words::Entity::find()
        .filter(restricted_words::Column::Word.eq(word))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Restricted word {:?} already exists",
            word
        )));
    }

    let model = restricted_words::ActiveModel {
        word: Set(word.to_owned()),
        normalized: Set(normalize(word)),
        severity: Set(severity),
        replacement: Set(replacement.unwrap_or_else(|| default_replacement(word))),
        created_by: Set(created_by),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Remove a restricted word from the dictionary
pub async fn delete_word<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ServiceError> {
    let result = restricted_words::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Restricted word {} not found",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        id: i32,
        word: &str,
        severity: Severity,
        replacement: Option<&str>,
    ) -> restricted_words::Model {
        restricted_words::Model {
            id,
            word: word.to_owned(),
            normalized: normalize(word),
            severity,
            replacement: replacement
                .map(str::to_owned)
                .unwrap_or_else(|| default_replacement(word)),
            created_by: None,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    fn index() -> WordIndex {
        WordIndex::from_entries(vec![
            entry(1, "cặc", Severity::Ban, None),
            entry(2, "đm", Severity::Warn, Some("đ*")),
            entry(3, "vãi", Severity::Hide, None),
        ])
    }

    #[test]
    fn test_scan_whole_word_ban() {
        let result = index().scan("quán này cặc quá");
        assert!(result.has_banned);
        assert_eq!(result.banned_words(), vec!["cặc".to_owned()]);
    }

    #[test]
    fn test_scan_matches_without_diacritics() {
        // Normalization folds both sides, so the unaccented form matches too
        let result = index().scan("CAC!");
        assert!(result.has_banned);
    }

    #[test]
    fn test_scan_substring_is_not_a_match() {
        let idx = WordIndex::from_entries(vec![entry(1, "du", Severity::Ban, None)]);
        assert!(!idx.scan("education").has_banned);
        assert!(idx.scan("du lịch").has_banned);
    }

    #[test]
    fn test_scan_strips_residual_punctuation() {
        let result = index().scan("thật là đm, đúng không?");
        assert!(!result.has_banned);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].word, "đm");
    }

    #[test]
    fn test_scan_reports_each_word_once() {
        let result = index().scan("đm đm ĐM");
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn test_validate_submission_rejects_ban() {
        let err = index()
            .validate_submission(&["Cozy Cafe", "ngon nhưng cặc"])
            .unwrap_err();
        match err {
            ServiceError::ContentRejected { words } => assert_eq!(words, vec!["cặc".to_owned()]),
            other => panic!("expected ContentRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_submission_allows_warn() {
        assert!(index().validate_submission(&["hơi đm nhưng ổn"]).is_ok());
    }

    #[test]
    fn test_sanitize_replaces_warn_and_hide() {
        let idx = index();
        assert_eq!(idx.sanitize("thật đm luôn"), "thật đ* luôn");
        assert_eq!(idx.sanitize("ngon vãi"), "ngon v**");
    }

    #[test]
    fn test_sanitize_is_case_insensitive_and_word_bounded() {
        let idx = WordIndex::from_entries(vec![entry(1, "dm", Severity::Warn, Some("d*"))]);
        assert_eq!(idx.sanitize("DM that place"), "d* that place");
        // No rewrite inside a larger word
        assert_eq!(idx.sanitize("admin panel"), "admin panel");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let idx = index();
        let once = idx.sanitize("thật đm luôn vãi");
        assert_eq!(idx.sanitize(&once), once);
    }

    #[test]
    fn test_sanitize_leaves_ban_words_untouched() {
        assert_eq!(index().sanitize("cặc"), "cặc");
    }

    #[test]
    fn test_default_replacement() {
        assert_eq!(default_replacement("đm"), "đ*");
        assert_eq!(default_replacement("word"), "w***");
        assert_eq!(default_replacement(""), "");
    }

    #[test]
    fn test_empty_index_passes_everything() {
        let idx = WordIndex::default();
        assert!(!idx.scan("anything at all").has_banned);
        assert_eq!(idx.sanitize("anything at all"), "anything at all");
    }
}
