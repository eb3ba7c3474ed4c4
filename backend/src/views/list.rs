// src/views/list.rs
//
// Shared listing-view logic for the table and board presentations.
//
// FLOW (status change):
// 1. Reject unknown rows and rows whose update is still in flight
// 2. Validate the transition (Draft -> Approved -> Sent)
// 3. Snapshot the list, apply the new status locally, mark the row updating
// 4. Call the store, conditional on the status the transition was checked from
// 5. Success -> success notice; failure -> roll back, error notice
// 6. Clear the row's updating flag
//
// Rollback restores the whole snapshot when nothing else touched the list in
// the meantime. If the list moved on (a reload, another row's update), only
// this row is put back.
//
// The state mutex is never held across an await, so transitions on other
// rows proceed while one row waits on the store.

use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::leads::{
    can_transition, validate_transition, DynLeadStore, IllegalTransition, Lead, LeadStatus,
    LeadUpdate,
};
use crate::views::notice::Notice;

/// Client-side copy of the lead list.
///
/// `revision` bumps on every change, so a caller can tell whether the list
/// moved since it last looked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadList {
    leads: Vec<Lead>,
    revision: u64,
}

/// Opaque copy of a `LeadList`, taken before an optimistic update.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadListSnapshot {
    leads: Vec<Lead>,
    revision: u64,
}

impl LeadList {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self { leads, revision: 0 }
    }

    pub fn set(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
        self.revision += 1;
    }

    pub fn snapshot(&self) -> LeadListSnapshot {
        LeadListSnapshot {
            leads: self.leads.clone(),
            revision: self.revision,
        }
    }

    /// Put the list back exactly as it was when `snapshot` was taken.
    pub fn restore(&mut self, snapshot: LeadListSnapshot) {
        self.leads = snapshot.leads;
        self.revision = snapshot.revision;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the row with `previous.id` by `previous`, but only while that
    /// row still shows the `optimistic` status. Returns whether it was replaced.
    pub fn revert_row(&mut self, previous: Lead, optimistic: LeadStatus) -> bool {
        match self
            .leads
            .iter_mut()
            .find(|l| l.id == previous.id && l.status == optimistic)
        {
            Some(lead) => {
                *lead = previous;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Merge `changes` into the row with `id`. Returns false if there is no such row.
    pub fn apply(&mut self, id: Uuid, changes: &LeadUpdate) -> bool {
        match self.leads.iter_mut().find(|l| l.id == id) {
            Some(lead) => {
                changes.apply_to(lead);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lead> {
        self.leads.iter()
    }

    pub fn as_slice(&self) -> &[Lead] {
        &self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

#[derive(Debug, Default)]
struct ViewState {
    leads: LeadList,
    updating: HashSet<Uuid>,
    loading: bool,
}

/// State owned by one listing view instance.
pub struct LeadsView {
    store: DynLeadStore,
    state: Mutex<ViewState>,
}

impl LeadsView {
    /// A fresh view starts in the loading state until `load` resolves.
    pub fn new(store: DynLeadStore) -> Self {
        Self {
            store,
            state: Mutex::new(ViewState {
                loading: true,
                ..Default::default()
            }),
        }
    }

    /// Fetch every lead from the store.
    ///
    /// Failures are logged and leave an empty list; the returned notice is
    /// for the caller to surface.
    pub async fn load(&self) -> Result<usize, Notice> {
        self.state.lock().loading = true;

        let result = self.store.list().await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(leads) => {
                let count = leads.len();
                state.leads.set(leads);
                info!("Loaded {} leads", count);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching leads: {}", e);
                state.leads.set(Vec::new());
                Err(Notice::error("Failed to load leads"))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn leads(&self) -> LeadList {
        self.state.lock().leads.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Lead> {
        self.state.lock().leads.get(id).cloned()
    }

    pub fn is_updating(&self, id: Uuid) -> bool {
        self.state.lock().updating.contains(&id)
    }

    /// Whether the control moving `id` to `target` should be enabled.
    pub fn can_advance(&self, id: Uuid, target: LeadStatus) -> bool {
        let state = self.state.lock();
        match state.leads.get(id) {
            Some(lead) => !state.updating.contains(&id) && can_transition(lead.status, target),
            None => false,
        }
    }

    /// Move `id` to `target` with an optimistic local update.
    pub async fn change_status(&self, id: Uuid, target: LeadStatus) -> Result<Notice, Notice> {
        self.transition(id, target, |e| e.to_string()).await
    }

    /// Shared by the table and board presentations; `rejected` words the
    /// illegal-transition notice.
    pub(crate) async fn transition(
        &self,
        id: Uuid,
        target: LeadStatus,
        rejected: impl FnOnce(IllegalTransition) -> String,
    ) -> Result<Notice, Notice> {
        let changes = LeadUpdate::status(target);

        let (snapshot, previous, applied) = {
            let mut state = self.state.lock();

            let previous = match state.leads.get(id) {
                Some(lead) => lead.clone(),
                None => {
                    warn!("Status change requested for unknown lead {}", id);
                    return Err(Notice::error("Lead not found"));
                }
            };

            if state.updating.contains(&id) {
                return Err(Notice::error("Lead is already being updated"));
            }

            if let Err(e) = validate_transition(previous.status, target) {
                return Err(Notice::error(rejected(e)));
            }

            let snapshot = state.leads.snapshot();
            state.leads.apply(id, &changes);
            state.updating.insert(id);
            (snapshot, previous, state.leads.revision())
        };

        let result = self
            .store
            .update_if_status(id, previous.status, changes)
            .await;

        let mut state = self.state.lock();
        state.updating.remove(&id);
        match result {
            Ok(_) => {
                info!("Lead {} status updated to {}", id, target);
                Ok(Notice::success(format!("Lead status updated to {}", target)))
            }
            Err(e) => {
                error!("Error updating lead status for {}: {}", id, e);
                if state.leads.revision() == applied {
                    state.leads.restore(snapshot);
                } else {
                    state.leads.revert_row(previous, target);
                }
                Err(Notice::error("Failed to update lead status"))
            }
        }
    }
}
