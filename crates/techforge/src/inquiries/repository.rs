use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::domain::{Inquiry, InquiryId, InquiryQuery, NewInquiry};

/// Storage abstraction owning every persisted inquiry.
///
/// Writes are serialized per call; there is no compare-and-swap, so two concurrent `save`
/// calls for the same inquiry resolve as last-write-wins.
pub trait InquiryRepository: Send + Sync {
    /// Assigns the identifier, timestamps, and `new` status.
    fn create(&self, fields: NewInquiry) -> Result<Inquiry, RepositoryError>;
    fn get(&self, id: InquiryId) -> Result<Inquiry, RepositoryError>;
    /// Refreshes `updated_at` and persists everything except `id` and `created_at`.
    fn save(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError>;
    /// Newest first.
    fn list(&self, query: &InquiryQuery) -> Result<Vec<Inquiry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("inquiry {0} not found")]
    NotFound(InquiryId),
    #[error("inquiry store unavailable: {0}")]
    Unavailable(String),
}

/// Inquiry table plus id sequence, shared by the in-memory and file-backed stores.
#[derive(Debug, Clone, Default)]
pub(crate) struct InquiryTable {
    next_id: u64,
    rows: BTreeMap<InquiryId, Inquiry>,
}

impl InquiryTable {
    pub(crate) fn from_rows(rows: Vec<Inquiry>) -> Self {
        let rows: BTreeMap<InquiryId, Inquiry> =
            rows.into_iter().map(|row| (row.id, row)).collect();
        let next_id = rows.keys().next_back().map_or(1, |id| id.0 + 1);
        Self { next_id, rows }
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &Inquiry> {
        self.rows.values()
    }

    pub(crate) fn create(&mut self, fields: NewInquiry, now: DateTime<Utc>) -> Inquiry {
        let id = InquiryId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        let inquiry = Inquiry::from_new(id, fields, now);
        self.rows.insert(id, inquiry.clone());
        inquiry
    }

    pub(crate) fn get(&self, id: InquiryId) -> Result<Inquiry, RepositoryError> {
        self.rows
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    pub(crate) fn save(
        &mut self,
        mut inquiry: Inquiry,
        now: DateTime<Utc>,
    ) -> Result<Inquiry, RepositoryError> {
        let stored = self
            .rows
            .get_mut(&inquiry.id)
            .ok_or(RepositoryError::NotFound(inquiry.id))?;

        inquiry.created_at = stored.created_at;
        inquiry.updated_at = next_timestamp(stored.updated_at, now);
        *stored = inquiry.clone();
        Ok(inquiry)
    }

    pub(crate) fn list(&self, query: &InquiryQuery) -> Vec<Inquiry> {
        let mut matches: Vec<Inquiry> = self
            .rows
            .values()
            .filter(|inquiry| query.matches(inquiry))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        matches
    }
}

/// `updated_at` must strictly increase even when the wall clock has not moved.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
