use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ReportTable;

/// In-memory store of recently built report tables, keyed by report id.
///
/// Each successful report gets its own id, so an export link always resolves
/// to the table the user was looking at. The most recently stored table is
/// also the fallback for exports that name no report. Only the newest
/// `capacity` tables are kept.
#[derive(Clone)]
pub struct ExportCache {
    reports: Arc<DashMap<Uuid, ReportTable>>,
    // Insertion order, oldest first; the back is the latest report.
    order: Arc<Mutex<VecDeque<Uuid>>>,
    capacity: usize,
}

impl ExportCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            reports: Arc::new(DashMap::new()),
            order: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Stores `table` as the latest report and returns its id.
    pub fn store(&self, table: ReportTable) -> Uuid {
        let id = Uuid::new_v4();
        let mut order = self.order.lock();

        self.reports.insert(id, table);
        order.push_back(id);

        while order.len() > self.capacity {
            if let Some(evicted) = order.pop_front() {
                self.reports.remove(&evicted);
                debug!("Evicted report {} from export cache", evicted);
            }
        }

        id
    }

    /// Returns the table for `id`, or the latest table when `id` is `None`.
    pub fn retrieve(&self, id: Option<Uuid>) -> Result<ReportTable, AppError> {
        match id {
            Some(id) => self
                .reports
                .get(&id)
                .map(|entry| entry.value().clone())
                .ok_or(AppError::ReportNotFound(id)),
            None => self
                .latest_id()
                .and_then(|id| self.reports.get(&id).map(|entry| entry.value().clone()))
                .ok_or(AppError::NoDataAvailable),
        }
    }

    pub fn latest_id(&self) -> Option<Uuid> {
        self.order.lock().back().copied()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }
}
