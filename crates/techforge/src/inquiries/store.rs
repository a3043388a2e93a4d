use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{Inquiry, InquiryId, InquiryQuery, NewInquiry};
use super::repository::{InquiryRepository, InquiryTable, RepositoryError};

fn lock(table: &Mutex<InquiryTable>) -> Result<MutexGuard<'_, InquiryTable>, RepositoryError> {
    table
        .lock()
        .map_err(|_| RepositoryError::Unavailable("inquiry table lock poisoned".to_string()))
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryInquiryRepository {
    table: Arc<Mutex<InquiryTable>>,
}

impl InquiryRepository for InMemoryInquiryRepository {
    fn create(&self, fields: NewInquiry) -> Result<Inquiry, RepositoryError> {
        Ok(lock(&self.table)?.create(fields, Utc::now()))
    }

    fn get(&self, id: InquiryId) -> Result<Inquiry, RepositoryError> {
        lock(&self.table)?.get(id)
    }

    fn save(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        lock(&self.table)?.save(inquiry, Utc::now())
    }

    fn list(&self, query: &InquiryQuery) -> Result<Vec<Inquiry>, RepositoryError> {
        Ok(lock(&self.table)?.list(query))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    inquiries: Vec<Inquiry>,
}

/// Durable store keeping every inquiry in one JSON document.
///
/// Each write stages the change on a copy of the table, writes the whole snapshot to a
/// sibling temp file and renames it over the original. The in-memory table is only swapped
/// once the rename succeeded, so a failed write leaves both disk and memory unchanged.
#[derive(Debug)]
pub struct JsonFileInquiryRepository {
    path: PathBuf,
    table: Mutex<InquiryTable>,
}

impl JsonFileInquiryRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let table = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|err| {
                    RepositoryError::Unavailable(format!(
                        "unable to parse {}: {err}",
                        path.display()
                    ))
                })?;
                info!(
                    path = %path.display(),
                    inquiries = snapshot.inquiries.len(),
                    "loaded inquiry store"
                );
                InquiryTable::from_rows(snapshot.inquiries)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "starting empty inquiry store");
                InquiryTable::default()
            }
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "unable to read {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit<T>(
        &self,
        change: impl FnOnce(&mut InquiryTable) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.table)?;
        let mut staged = guard.clone();
        let outcome = change(&mut staged)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(outcome)
    }

    fn persist(&self, table: &InquiryTable) -> Result<(), RepositoryError> {
        let snapshot = Snapshot {
            inquiries: table.rows().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error("create directory", err))?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, bytes).map_err(|err| self.io_error("write", err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error("replace", err))?;
        debug!(path = %self.path.display(), rows = snapshot.inquiries.len(), "inquiry store flushed");
        Ok(())
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> RepositoryError {
        RepositoryError::Unavailable(format!(
            "unable to {action} {}: {err}",
            self.path.display()
        ))
    }
}

impl InquiryRepository for JsonFileInquiryRepository {
    fn create(&self, fields: NewInquiry) -> Result<Inquiry, RepositoryError> {
        self.commit(|table| Ok(table.create(fields, Utc::now())))
    }

    fn get(&self, id: InquiryId) -> Result<Inquiry, RepositoryError> {
        lock(&self.table)?.get(id)
    }

    fn save(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        self.commit(|table| table.save(inquiry, Utc::now()))
    }

    fn list(&self, query: &InquiryQuery) -> Result<Vec<Inquiry>, RepositoryError> {
        Ok(lock(&self.table)?.list(query))
    }
}

/// Either backend, chosen at startup from configuration.
#[derive(Debug)]
pub enum InquiryStore {
    Memory(InMemoryInquiryRepository),
    File(JsonFileInquiryRepository),
}

impl InquiryStore {
    pub fn open(path: Option<&Path>) -> Result<Self, RepositoryError> {
        match path {
            Some(path) => JsonFileInquiryRepository::open(path).map(Self::File),
            None => Ok(Self::Memory(InMemoryInquiryRepository::default())),
        }
    }

    fn backend(&self) -> &dyn InquiryRepository {
        match self {
            InquiryStore::Memory(store) => store,
            InquiryStore::File(store) => store,
        }
    }
}

impl InquiryRepository for InquiryStore {
    fn create(&self, fields: NewInquiry) -> Result<Inquiry, RepositoryError> {
        self.backend().create(fields)
    }

    fn get(&self, id: InquiryId) -> Result<Inquiry, RepositoryError> {
        self.backend().get(id)
    }

    fn save(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        self.backend().save(inquiry)
    }

    fn list(&self, query: &InquiryQuery) -> Result<Vec<Inquiry>, RepositoryError> {
        self.backend().list(query)
    }
}
