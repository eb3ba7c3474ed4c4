use serde::Serialize;
use uuid::Uuid;

use crate::leads::{Lead, LeadStatus};
use crate::views::{list::LeadsView, notice::Notice};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One rendered table row with its action availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub lead: Lead,
    pub approve_enabled: bool,
    pub send_enabled: bool,
    pub updating: bool,
}

/// Table presentation: per-row "Approve" and "Mark as Sent" buttons plus a global search.
pub struct LeadsTable {
    view: LeadsView,
}

impl LeadsTable {
    pub fn new(view: LeadsView) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &LeadsView {
        &self.view
    }

    pub async fn approve(&self, id: Uuid) -> Result<Notice, Notice> {
        self.view.change_status(id, LeadStatus::Approved).await
    }

    pub async fn mark_sent(&self, id: Uuid) -> Result<Notice, Notice> {
        self.view.change_status(id, LeadStatus::Sent).await
    }

    /// Rows matching `query` (case-insensitive over name, role, company and status).
    pub fn rows(&self, query: &str) -> Vec<TableRow> {
        let needle = query.trim().to_lowercase();

        self.view
            .leads()
            .iter()
            .filter(|lead| needle.is_empty() || matches_query(lead, &needle))
            .map(|lead| TableRow {
                lead: lead.clone(),
                approve_enabled: self.view.can_advance(lead.id, LeadStatus::Approved),
                send_enabled: self.view.can_advance(lead.id, LeadStatus::Sent),
                updating: self.view.is_updating(lead.id),
            })
            .collect()
    }

    /// One page of `rows(query)`; `page` is zero-based.
    pub fn page(&self, query: &str, page: usize, page_size: usize) -> Vec<TableRow> {
        let page_size = page_size.max(1);
        self.rows(query)
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect()
    }

    pub fn page_count(&self, query: &str, page_size: usize) -> usize {
        let page_size = page_size.max(1);
        self.rows(query).len().div_ceil(page_size)
    }
}

fn matches_query(lead: &Lead, needle: &str) -> bool {
    [
        lead.name.as_str(),
        lead.role.as_str(),
        lead.company.as_str(),
        lead.status.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}
