use serde::Serialize;
use uuid::Uuid;

use crate::leads::{can_transition, Lead, LeadStatus};
use crate::views::{list::LeadsView, notice::Notice};

/// Where a dragged card was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The empty area of a status column.
    Column(LeadStatus),
    /// On top of another card; the card's column is the target.
    Card(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub status: LeadStatus,
    pub leads: Vec<Lead>,
}

impl BoardColumn {
    pub fn count(&self) -> usize {
        self.leads.len()
    }
}

/// Kanban presentation: one column per status, moves by drag and drop.
pub struct LeadsBoard {
    view: LeadsView,
}

impl LeadsBoard {
    pub fn new(view: LeadsView) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &LeadsView {
        &self.view
    }

    /// Draft, Approved, Sent, in that order, each keeping list order.
    pub fn columns(&self) -> Vec<BoardColumn> {
        let leads = self.view.leads();

        LeadStatus::ALL
            .iter()
            .map(|&status| BoardColumn {
                status,
                leads: leads.iter().filter(|l| l.status == status).cloned().collect(),
            })
            .collect()
    }

    pub fn resolve_target(&self, target: DropTarget) -> Option<LeadStatus> {
        match target {
            DropTarget::Column(status) => Some(status),
            DropTarget::Card(id) => self.view.get(id).map(|lead| lead.status),
        }
    }

    /// Drag-over feedback: true only for a different column the lead may legally enter.
    pub fn can_drop(&self, lead_id: Uuid, target: DropTarget) -> bool {
        let (Some(lead), Some(status)) = (self.view.get(lead_id), self.resolve_target(target)) else {
            return false;
        };
        lead.status != status && can_transition(lead.status, status) && !self.view.is_updating(lead_id)
    }

    /// Handle the end of a drag.
    ///
    /// Returns `None` when nothing should happen (no target, unknown card, or
    /// dropped back into its own column).
    pub async fn handle_drop(
        &self,
        lead_id: Uuid,
        target: Option<DropTarget>,
    ) -> Option<Result<Notice, Notice>> {
        let status = self.resolve_target(target?)?;
        let lead = self.view.get(lead_id)?;
        if lead.status == status {
            return None;
        }

        Some(
            self.view
                .transition(lead_id, status, |e| {
                    format!("Cannot move from {} to {}", e.from, e.to)
                })
                .await,
        )
    }
}
