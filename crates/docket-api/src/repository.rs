//! # Case Repository
//!
//! Persistence boundary for case files. A [`CaseFile`] bundles the case
//! aggregate, its hearing ledger and an optimistic-concurrency version; the
//! three are always written together.
//!
//! [`CaseRepository::commit`] is a conditional write: it succeeds only if the
//! stored version still equals the version the caller read. The in-memory
//! implementation performs the compare and the swap under one
//! `parking_lot::RwLock` write guard, so two concurrent commits on the same
//! version cannot both land.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use docket_core::CaseId;
use docket_ledger::HearingLedger;
use docket_state::Case;

/// A case together with its hearing ledger and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFile {
    pub case: Case,
    pub hearings: HearingLedger,
    /// Incremented on every committed transition. Starts at 1 on filing.
    pub version: u64,
}

impl CaseFile {
    /// Wrap a freshly filed case.
    pub fn new(case: Case) -> Self {
        let hearings = HearingLedger::new(case.id());
        Self {
            case,
            hearings,
            version: 1,
        }
    }

    /// Shorthand for `case.id()`.
    pub fn id(&self) -> CaseId {
        self.case.id()
    }
}

/// Repository failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(CaseId),

    #[error("{0} already exists")]
    Duplicate(CaseId),

    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

/// Storage for case files.
pub trait CaseRepository: Send + Sync {
    /// Load a case file.
    fn get(&self, id: CaseId) -> Option<CaseFile>;

    /// Store a new case file.
    fn insert(&self, file: CaseFile) -> Result<(), RepositoryError>;

    /// Every stored case file, ordered by filing time.
    fn list(&self) -> Vec<CaseFile>;

    /// Replace the stored file with `next` if its version is still
    /// `expected_version`.
    fn commit(
        &self,
        id: CaseId,
        expected_version: u64,
        next: CaseFile,
    ) -> Result<(), RepositoryError>;
}

/// In-memory [`CaseRepository`].
///
/// All operations are synchronous: the lock is `parking_lot`, never held
/// across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseRepository {
    data: Arc<RwLock<HashMap<CaseId, CaseFile>>>,
}

impl InMemoryCaseRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cases.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl CaseRepository for InMemoryCaseRepository {
    fn get(&self, id: CaseId) -> Option<CaseFile> {
        self.data.read().get(&id).cloned()
    }

    fn insert(&self, file: CaseFile) -> Result<(), RepositoryError> {
        let mut guard = self.data.write();
        let id = file.id();
        if guard.contains_key(&id) {
            return Err(RepositoryError::Duplicate(id));
        }
        guard.insert(id, file);
        Ok(())
    }

    fn list(&self) -> Vec<CaseFile> {
        let mut files: Vec<CaseFile> = self.data.read().values().cloned().collect();
        files.sort_by(|a, b| {
            a.case
                .filed_at()
                .cmp(&b.case.filed_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        files
    }

    fn commit(
        &self,
        id: CaseId,
        expected_version: u64,
        next: CaseFile,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.data.write();
        let current = guard.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                actual: current.version,
            });
        }
        *current = next;
        Ok(())
    }
}
