//! Persisted store of accepted false positives.
//!
//! The store is read once at the start of a run and rewritten wholesale on
//! every mutation. Writes go to a temporary file in the same directory that
//! is then atomically renamed over the target, so concurrent runs never see
//! a truncated file.

use crate::types::{normalize_path, ValidationResult, Violation};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Window used by [`OverrideStatistics::recent`].
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Review status of an override. Only approved overrides suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideStatus {
    /// Accepted as a false positive; suppresses matching violations.
    Approved,
    /// Awaiting review.
    Pending,
    /// Reviewed and declined.
    Rejected,
}

impl std::fmt::Display for OverrideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Pending => write!(f, "pending"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for OverrideStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!(
                "unknown status `{other}`, expected: approved, pending, rejected"
            )),
        }
    }
}

/// How precisely overrides are matched against violations.
///
/// Rule and file always take part in the key, and so does the violation's
/// code hash when it carries one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrictness {
    /// Match on rule and file (plus code hash when present).
    #[default]
    RuleFile,
    /// Additionally require the line to match when the override records one.
    RuleFileLine,
}

/// A persisted suppression of a known false positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// Rule name.
    pub rule: String,
    /// File path relative to the project root.
    pub file_path: PathBuf,
    /// Why the violation is accepted.
    pub reason: String,
    /// Review status.
    pub status: OverrideStatus,
    /// When the override was recorded.
    pub created_at: DateTime<Utc>,
    /// Code hash of the suppressed violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Line of the suppressed violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Override {
    /// Creates an override for a rule and file, timestamped now.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        file_path: impl Into<PathBuf>,
        reason: impl Into<String>,
        status: OverrideStatus,
    ) -> Self {
        Self {
            rule: rule.into(),
            file_path: file_path.into(),
            reason: reason.into(),
            status,
            created_at: Utc::now(),
            code: None,
            line: None,
        }
    }

    /// Creates an approved override that suppresses exactly this violation.
    #[must_use]
    pub fn for_violation(violation: &Violation, reason: impl Into<String>) -> Self {
        Self {
            code: violation.code.clone(),
            line: Some(violation.line),
            ..Self::new(
                violation.rule.clone(),
                violation.file_path.clone(),
                reason,
                OverrideStatus::Approved,
            )
        }
    }

    /// Sets the code hash.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    fn same_key(&self, other: &Self) -> bool {
        self.rule == other.rule
            && normalize_path(&self.file_path) == normalize_path(&other.file_path)
            && self.code == other.code
            && self.line == other.line
    }
}

/// Selects overrides for removal or status changes.
///
/// Every field that is set must match; an empty criteria matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideCriteria {
    /// Rule name.
    pub rule: Option<String>,
    /// File path.
    pub file_path: Option<PathBuf>,
    /// Code hash.
    pub code: Option<String>,
    /// Status.
    pub status: Option<OverrideStatus>,
}

impl OverrideCriteria {
    /// Creates empty criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a rule.
    #[must_use]
    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Restricts to a file.
    #[must_use]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Restricts to a code hash.
    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Restricts to a status.
    #[must_use]
    pub fn status(mut self, status: OverrideStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule.is_none()
            && self.file_path.is_none()
            && self.code.is_none()
            && self.status.is_none()
    }

    /// Tests whether an override satisfies every set field.
    #[must_use]
    pub fn matches(&self, record: &Override) -> bool {
        if self.is_empty() {
            return false;
        }
        self.rule.as_ref().map_or(true, |r| *r == record.rule)
            && self.file_path.as_ref().map_or(true, |p| {
                normalize_path(p) == normalize_path(&record.file_path)
            })
            && self
                .code
                .as_ref()
                .map_or(true, |c| record.code.as_ref() == Some(c))
            && self.status.map_or(true, |s| s == record.status)
    }
}

/// Aggregate statistics over the stored overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideStatistics {
    /// Number of stored overrides.
    pub total: usize,
    /// Overrides created within the last seven days.
    pub recent: usize,
    /// Override count per rule.
    pub by_rule: BTreeMap<String, usize>,
}

/// Errors reading or writing the override file.
#[derive(Debug, thiserror::Error)]
pub enum OverrideStoreError {
    /// The file exists but could not be read.
    #[error("failed to read override file {path}: {source}")]
    Read {
        /// Override file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file content is not a valid override document.
    #[error("override file {path} is malformed: {message}")]
    Malformed {
        /// Override file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The file declares a format version this build does not know.
    #[error("override file {path} has unsupported version {version}")]
    UnsupportedVersion {
        /// Override file path.
        path: PathBuf,
        /// Declared version.
        version: u32,
    },

    /// Serializing the override set failed.
    #[error("failed to serialize overrides: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The file could not be written or replaced.
    #[error("failed to write override file {path}: {source}")]
    Write {
        /// Override file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// What [`OverrideStore::load`] found on disk.
#[derive(Debug)]
pub enum LoadStatus {
    /// The file was read successfully.
    Loaded(usize),
    /// No file exists yet; the store is empty.
    Missing,
    /// The file could not be used; the store is empty.
    Recovered(OverrideStoreError),
}

#[derive(Serialize)]
struct OverrideDocumentRef<'a> {
    version: u32,
    overrides: &'a [Override],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverrideDocument {
    Versioned { version: u32, overrides: Vec<Override> },
    Bare(Vec<Override>),
}

/// The override store.
///
/// Internal updates are serialized behind a lock, so one handle may be
/// shared across threads.
#[derive(Debug)]
pub struct OverrideStore {
    path: PathBuf,
    strictness: MatchStrictness,
    records: RwLock<Vec<Override>>,
}

impl OverrideStore {
    /// Creates an empty store backed by `path`. Call [`Self::load`] to read it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, strictness: MatchStrictness) -> Self {
        Self {
            path: path.into(),
            strictness,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the matching strictness.
    #[must_use]
    pub fn strictness(&self) -> MatchStrictness {
        self.strictness
    }

    /// Reads the persisted overrides into memory.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is logged and also yields an empty store; overrides never fail a run.
    pub fn load(&self) -> LoadStatus {
        let (records, status) = match read_document(&self.path) {
            Ok(Some(records)) => {
                let n = records.len();
                debug!("Loaded {} override(s) from {}", n, self.path.display());
                (records, LoadStatus::Loaded(n))
            }
            Ok(None) => {
                debug!("No override file at {}", self.path.display());
                (Vec::new(), LoadStatus::Missing)
            }
            Err(e) => {
                warn!("{}; continuing without overrides", e);
                (Vec::new(), LoadStatus::Recovered(e))
            }
        };
        *self.write_guard() = records;
        status
    }

    /// Returns true if an approved override suppresses `violation` in `file_path`.
    #[must_use]
    pub fn is_overridden(&self, violation: &Violation, file_path: &Path) -> bool {
        let file = normalize_path(file_path);
        self.read_guard()
            .iter()
            .any(|o| self.suppresses(o, violation, &file))
    }

    fn suppresses(&self, record: &Override, violation: &Violation, file: &str) -> bool {
        if record.status != OverrideStatus::Approved
            || record.rule != violation.rule
            || normalize_path(&record.file_path) != file
        {
            return false;
        }
        // The violation's code hash, when present, is part of the key; an
        // uncoded violation falls back to (rule, file).
        if let Some(code) = &violation.code {
            if record.code.as_ref() != Some(code) {
                return false;
            }
        }
        match (self.strictness, record.line) {
            (MatchStrictness::RuleFileLine, Some(line)) => line == violation.line,
            _ => true,
        }
    }

    /// Adds an override and persists the store.
    ///
    /// A record with the same rule, file, code, and line replaces the
    /// existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written; memory is unchanged.
    pub fn add_override(&self, record: Override) -> Result<(), OverrideStoreError> {
        let mut guard = self.write_guard();
        let mut next: Vec<Override> = guard
            .iter()
            .filter(|o| !o.same_key(&record))
            .cloned()
            .collect();
        info!(
            "Adding {} override for {} in {}",
            record.status,
            record.rule,
            record.file_path.display()
        );
        next.push(record);
        write_document(&self.path, &next)?;
        *guard = next;
        Ok(())
    }

    /// Removes every override matching `criteria` and persists the store.
    ///
    /// Returns the number of overrides removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written; memory is unchanged.
    pub fn remove_override(&self, criteria: &OverrideCriteria) -> Result<usize, OverrideStoreError> {
        let mut guard = self.write_guard();
        let next: Vec<Override> = guard
            .iter()
            .filter(|o| !criteria.matches(o))
            .cloned()
            .collect();
        let removed = guard.len() - next.len();
        if removed > 0 {
            write_document(&self.path, &next)?;
            *guard = next;
            info!("Removed {} override(s)", removed);
        }
        Ok(removed)
    }

    /// Sets the status of every override matching `criteria` and persists.
    ///
    /// Returns the number of overrides changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written; memory is unchanged.
    pub fn set_status(
        &self,
        criteria: &OverrideCriteria,
        status: OverrideStatus,
    ) -> Result<usize, OverrideStoreError> {
        let mut guard = self.write_guard();
        let mut next = guard.clone();
        let mut changed = 0;
        for o in next.iter_mut().filter(|o| criteria.matches(o)) {
            if o.status != status {
                o.status = status;
                changed += 1;
            }
        }
        if changed > 0 {
            write_document(&self.path, &next)?;
            *guard = next;
            info!("Marked {} override(s) {}", changed, status);
        }
        Ok(changed)
    }

    /// Returns a snapshot of all stored overrides.
    #[must_use]
    pub fn list_overrides(&self) -> Vec<Override> {
        self.read_guard().clone()
    }

    /// Returns statistics relative to the current time.
    #[must_use]
    pub fn statistics(&self) -> OverrideStatistics {
        self.statistics_at(Utc::now())
    }

    /// Returns statistics relative to `now`.
    #[must_use]
    pub fn statistics_at(&self, now: DateTime<Utc>) -> OverrideStatistics {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let records = self.read_guard();
        let mut stats = OverrideStatistics {
            total: records.len(),
            ..OverrideStatistics::default()
        };
        for o in records.iter() {
            if o.created_at >= cutoff && o.created_at <= now {
                stats.recent += 1;
            }
            *stats.by_rule.entry(o.rule.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Removes overridden violations from every result and re-derives `passed`.
    ///
    /// Applying this twice gives the same result as applying it once.
    #[must_use]
    pub fn apply(&self, mut results: Vec<ValidationResult>) -> Vec<ValidationResult> {
        let mut suppressed = 0;
        for result in &mut results {
            suppressed += result.retain_violations(|v| !self.is_overridden(v, &v.file_path));
        }
        if suppressed > 0 {
            info!("Suppressed {} violation(s) via overrides", suppressed);
        }
        results
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Vec<Override>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Vec<Override>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_document(path: &Path) -> Result<Option<Vec<Override>>, OverrideStoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(OverrideStoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    let doc: OverrideDocument =
        serde_json::from_str(&content).map_err(|e| OverrideStoreError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    match doc {
        OverrideDocument::Versioned { version, overrides } if version <= FORMAT_VERSION => {
            Ok(Some(overrides))
        }
        OverrideDocument::Versioned { version, .. } => {
            Err(OverrideStoreError::UnsupportedVersion {
                path: path.to_path_buf(),
                version,
            })
        }
        OverrideDocument::Bare(overrides) => Ok(Some(overrides)),
    }
}

fn write_document(path: &Path, records: &[Override]) -> Result<(), OverrideStoreError> {
    let write_err = |source| OverrideStoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let doc = OverrideDocumentRef {
        version: FORMAT_VERSION,
        overrides: records,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    serde_json::to_writer_pretty(&mut tmp, &doc)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> OverrideStore {
        OverrideStore::open(
            dir.path().join(".archgate/overrides.json"),
            MatchStrictness::RuleFile,
        )
    }

    fn eval_violation() -> Violation {
        Violation::new("no-eval", "src/a.js", 3, Severity::Error, "eval() detected")
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(matches!(store.load(), LoadStatus::Missing));
        assert!(store.list_overrides().is_empty());
    }

    #[test]
    fn malformed_file_recovers_to_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = OverrideStore::open(&path, MatchStrictness::RuleFile);
        assert!(matches!(
            store.load(),
            LoadStatus::Recovered(OverrideStoreError::Malformed { .. })
        ));
        assert!(store.list_overrides().is_empty());
    }

    #[test]
    fn future_version_recovers_to_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, r#"{"version": 99, "overrides": []}"#).unwrap();

        let store = OverrideStore::open(&path, MatchStrictness::RuleFile);
        assert!(matches!(
            store.load(),
            LoadStatus::Recovered(OverrideStoreError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn bare_array_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"[{"rule":"no-eval","file_path":"src/a.js","reason":"ok","status":"approved","created_at":"2026-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let store = OverrideStore::open(&path, MatchStrictness::RuleFile);
        assert!(matches!(store.load(), LoadStatus::Loaded(1)));
        assert!(store.is_overridden(&eval_violation(), Path::new("src/a.js")));
    }

    #[test]
    fn approved_suppresses_pending_and_rejected_do_not() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let v = eval_violation();
        let file = Path::new("src/a.js");

        store
            .add_override(Override::new("no-eval", "src/a.js", "sandboxed", OverrideStatus::Approved))
            .unwrap();
        assert!(store.is_overridden(&v, file));

        let criteria = OverrideCriteria::new().rule("no-eval");
        store.set_status(&criteria, OverrideStatus::Pending).unwrap();
        assert!(!store.is_overridden(&v, file));

        store.set_status(&criteria, OverrideStatus::Rejected).unwrap();
        assert!(!store.is_overridden(&v, file));
    }

    #[test]
    fn match_is_exact_on_rule_and_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("no-eval", "./src/a.js", "ok", OverrideStatus::Approved))
            .unwrap();

        let v = eval_violation();
        assert!(store.is_overridden(&v, Path::new("src/a.js")));
        assert!(!store.is_overridden(&v, Path::new("src/b.js")));
        assert!(!store.is_overridden(&v, Path::new("src/a.jsx")));

        let other_rule = Violation::new("no-with", "src/a.js", 3, Severity::Error, "with");
        assert!(!store.is_overridden(&other_rule, Path::new("src/a.js")));
    }

    #[test]
    fn code_hash_is_part_of_the_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(
                Override::new("no-eval", "src/a.js", "ok", OverrideStatus::Approved)
                    .with_code("abc"),
            )
            .unwrap();

        let known = eval_violation().with_code("abc");
        let new_issue = eval_violation().with_code("def");
        let file = Path::new("src/a.js");
        assert!(store.is_overridden(&known, file));
        assert!(!store.is_overridden(&new_issue, file));
    }

    #[test]
    fn override_without_code_does_not_hide_coded_violation() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("no-eval", "src/a.js", "ok", OverrideStatus::Approved))
            .unwrap();

        let coded = eval_violation().with_code("abc");
        assert!(!store.is_overridden(&coded, Path::new("src/a.js")));
    }

    #[test]
    fn coded_override_also_hides_uncoded_violation_in_same_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(
                Override::new("no-eval", "src/a.js", "ok", OverrideStatus::Approved)
                    .with_code("abc"),
            )
            .unwrap();

        let uncoded = eval_violation();
        assert!(uncoded.code.is_none());
        assert!(store.is_overridden(&uncoded, Path::new("src/a.js")));
        assert!(!store.is_overridden(&uncoded, Path::new("src/b.js")));
    }

    #[test]
    fn line_strictness() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("o.json");
        let loose = OverrideStore::open(&path, MatchStrictness::RuleFile);
        loose
            .add_override(
                Override::new("no-eval", "src/a.js", "ok", OverrideStatus::Approved).with_line(10),
            )
            .unwrap();

        let strict = OverrideStore::open(&path, MatchStrictness::RuleFileLine);
        strict.load();

        let v = eval_violation(); // line 3
        assert!(loose.is_overridden(&v, Path::new("src/a.js")));
        assert!(!strict.is_overridden(&v, Path::new("src/a.js")));

        let moved = Violation::new("no-eval", "src/a.js", 10, Severity::Error, "eval");
        assert!(strict.is_overridden(&moved, Path::new("src/a.js")));
    }

    #[test]
    fn mutations_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("a", "x.js", "r", OverrideStatus::Approved))
            .unwrap();
        store
            .add_override(Override::new("b", "y.js", "r", OverrideStatus::Pending))
            .unwrap();

        let reopened = store_in(&dir);
        assert!(matches!(reopened.load(), LoadStatus::Loaded(2)));

        let removed = reopened
            .remove_override(&OverrideCriteria::new().rule("a"))
            .unwrap();
        assert_eq!(removed, 1);

        let third = store_in(&dir);
        third.load();
        let rules: Vec<_> = third.list_overrides().into_iter().map(|o| o.rule).collect();
        assert_eq!(rules, vec!["b"]);

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"version\": 1"));
    }

    #[test]
    fn add_replaces_same_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("a", "x.js", "first", OverrideStatus::Pending))
            .unwrap();
        store
            .add_override(Override::new("a", "./x.js", "second", OverrideStatus::Approved))
            .unwrap();

        let all = store.list_overrides();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].reason, "second");
    }

    #[test]
    fn empty_criteria_removes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("a", "x.js", "r", OverrideStatus::Approved))
            .unwrap();
        assert_eq!(store.remove_override(&OverrideCriteria::new()).unwrap(), 0);
        assert_eq!(store.list_overrides().len(), 1);
    }

    #[test]
    fn statistics_count_recent_and_by_rule() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        for (rule, days_ago) in [("no-eval", 1), ("no-eval", 6), ("naming", 8), ("naming", 30)] {
            store
                .add_override(
                    Override::new(rule, format!("f{days_ago}.js"), "r", OverrideStatus::Approved)
                        .created_at(now - Duration::days(days_ago)),
                )
                .unwrap();
        }

        let stats = store.statistics_at(now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.by_rule.get("no-eval"), Some(&2));
        assert_eq!(stats.by_rule.get("naming"), Some(&2));
    }

    #[test]
    fn apply_removes_suppressed_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .add_override(Override::new("no-eval", "src/a.js", "ok", OverrideStatus::Approved))
            .unwrap();

        let results = vec![
            ValidationResult::new("no-eval", "", vec![eval_violation()]),
            ValidationResult::new(
                "no-eval-b",
                "",
                vec![
                    eval_violation(),
                    Violation::new("no-eval", "src/b.js", 1, Severity::Error, "eval"),
                ],
            ),
        ];

        let once = store.apply(results);
        assert!(once[0].passed);
        assert!(once[0].violations.is_empty());
        assert!(!once[1].passed);
        assert_eq!(once[1].violations.len(), 1);

        let twice = store.apply(once.clone());
        assert_eq!(once, twice);
        for r in &twice {
            assert_eq!(r.passed, r.violations.is_empty());
        }
    }

    #[test]
    fn for_violation_captures_code_and_line() {
        let v = eval_violation().with_code("h1");
        let o = Override::for_violation(&v, "reviewed");
        assert_eq!(o.code.as_deref(), Some("h1"));
        assert_eq!(o.line, Some(3));
        assert_eq!(o.status, OverrideStatus::Approved);
    }

    #[test]
    fn concurrent_adds_are_serialized() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .add_override(Override::new(
                            "rule",
                            format!("f{i}.js"),
                            "r",
                            OverrideStatus::Approved,
                        ))
                        .unwrap();
                    store.is_overridden(
                        &Violation::new("rule", format!("f{i}.js"), 1, Severity::Info, "m"),
                        Path::new(&format!("f{i}.js")),
                    )
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap());
        }

        let reopened = store_in(&dir);
        assert!(matches!(reopened.load(), LoadStatus::Loaded(8)));
    }

    #[test]
    fn status_parse_round_trip() {
        for s in ["approved", "pending", "rejected"] {
            let status: OverrideStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("maybe".parse::<OverrideStatus>().is_err());
    }
}
