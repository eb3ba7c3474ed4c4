use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::leads::models::{Lead, LeadStatus, LeadUpdate, NewLead};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lead {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("lead {id} is {actual}, expected {expected}")]
    StatusChanged {
        id: Uuid,
        expected: LeadStatus,
        actual: LeadStatus,
    },

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row CRUD over the single `leads` collection.
///
/// Every call is one round trip to the store. Nothing is retried; failures
/// go straight back to the caller.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert one lead. The store assigns id, timestamps and the default status.
    async fn create(&self, lead: NewLead) -> Result<Lead, StoreError>;

    /// All leads, newest first.
    async fn list(&self) -> Result<Vec<Lead>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Lead, StoreError>;

    /// Merge `changes` into the lead with `id`.
    async fn update(&self, id: Uuid, changes: LeadUpdate) -> Result<Lead, StoreError>;

    /// Like `update`, but only while the stored status is still `expected`.
    /// The check and the write are one step; a mismatch is `StatusChanged`.
    async fn update_if_status(
        &self,
        id: Uuid,
        expected: LeadStatus,
        changes: LeadUpdate,
    ) -> Result<Lead, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short label for health output.
    fn kind(&self) -> &'static str;
}

/// Convenient type alias for dyn store.
pub type DynLeadStore = Arc<dyn LeadStore>;

// ----------------------------
// Postgres
// ----------------------------

/// Raw `leads` row. `status` is TEXT in the table.
#[derive(Debug, Clone, FromRow)]
struct LeadRow {
    id: Uuid,
    name: String,
    role: String,
    company: String,
    linkedin_url: Option<String>,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = StoreError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<LeadStatus>()
            .map_err(|e| StoreError::InvalidRow(format!("lead {}: {}", row.id, e)))?;

        Ok(Lead {
            id: row.id,
            name: row.name,
            role: row.role,
            company: row.company,
            linkedin_url: row.linkedin_url,
            message: row.message,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgLeadStore {
    pool: DbPool,
}

impl PgLeadStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Merge `changes`; with `expected` set, only a row still in that status
    /// matches. `None` means no row was written.
    async fn update_row(
        &self,
        id: Uuid,
        expected: Option<LeadStatus>,
        changes: &LeadUpdate,
    ) -> Result<Option<LeadRow>, StoreError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            UPDATE leads
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                company = COALESCE($4, company),
                linkedin_url = CASE WHEN $5 THEN $6 ELSE linkedin_url END,
                message = CASE WHEN $7 THEN $8 ELSE message END,
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1
              AND ($10::TEXT IS NULL OR status = $10)
            RETURNING id, name, role, company, linkedin_url, message, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.role)
        .bind(&changes.company)
        .bind(changes.linkedin_url.is_some())
        .bind(changes.linkedin_url.clone().flatten())
        .bind(changes.message.is_some())
        .bind(changes.message.clone().flatten())
        .bind(changes.status.map(|s| s.as_str()))
        .bind(expected.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, StoreError> {
        // Without an explicit status the column default decides.
        let row = match lead.status {
            Some(status) => {
                sqlx::query_as::<_, LeadRow>(
                    r#"
                    INSERT INTO leads (name, role, company, linkedin_url, message, status)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, name, role, company, linkedin_url, message, status,
                              created_at, updated_at
                    "#,
                )
                .bind(&lead.name)
                .bind(&lead.role)
                .bind(&lead.company)
                .bind(&lead.linkedin_url)
                .bind(&lead.message)
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeadRow>(
                    r#"
                    INSERT INTO leads (name, role, company, linkedin_url, message)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, name, role, company, linkedin_url, message, status,
                              created_at, updated_at
                    "#,
                )
                .bind(&lead.name)
                .bind(&lead.role)
                .bind(&lead.company)
                .bind(&lead.linkedin_url)
                .bind(&lead.message)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let lead = Lead::try_from(row)?;
        info!("Created lead {} ({} at {})", lead.id, lead.name, lead.company);
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT id, name, role, company, linkedin_url, message, status,
                   created_at, updated_at
            FROM leads
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Lead::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Lead, StoreError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT id, name, role, company, linkedin_url, message, status,
                   created_at, updated_at
            FROM leads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Lead::try_from(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn update(&self, id: Uuid, changes: LeadUpdate) -> Result<Lead, StoreError> {
        match self.update_row(id, None, &changes).await? {
            Some(row) => Lead::try_from(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: LeadStatus,
        changes: LeadUpdate,
    ) -> Result<Lead, StoreError> {
        if let Some(row) = self.update_row(id, Some(expected), &changes).await? {
            return Lead::try_from(row);
        }

        // Nothing written: either the row is gone or its status moved on.
        let actual = sqlx::query_scalar::<_, String>(
            r#"
            SELECT status
            FROM leads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match actual {
            Some(actual) => {
                let actual = actual
                    .parse::<LeadStatus>()
                    .map_err(|e| StoreError::InvalidRow(format!("lead {}: {}", id, e)))?;
                warn!("Lead {} is {}, expected {}; update skipped", id, actual, expected);
                Err(StoreError::StatusChanged { id, expected, actual })
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM leads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!("Deleted lead {}", id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

// ----------------------------
// In-memory
// ----------------------------

/// Process-local store used when no database is configured (development) and in tests.
///
/// Kept newest-first so `list` needs no sorting beyond ties.
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
    offline: AtomicBool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a connectivity failure: while offline every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            warn!("memory lead store is offline");
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, StoreError> {
        self.check_online()?;

        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            name: lead.name,
            role: lead.role,
            company: lead.company,
            linkedin_url: lead.linkedin_url,
            message: lead.message,
            status: lead.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.leads.write().await.insert(0, lead.clone());
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        self.check_online()?;

        let mut leads = self.leads.read().await.clone();
        // Stable sort keeps insertion order (newest first) for equal timestamps.
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn get(&self, id: Uuid) -> Result<Lead, StoreError> {
        self.check_online()?;

        self.leads
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: Uuid, changes: LeadUpdate) -> Result<Lead, StoreError> {
        self.check_online()?;

        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound(id))?;

        changes.apply_to(lead);
        lead.updated_at = Utc::now();
        Ok(lead.clone())
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: LeadStatus,
        changes: LeadUpdate,
    ) -> Result<Lead, StoreError> {
        self.check_online()?;

        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if lead.status != expected {
            return Err(StoreError::StatusChanged {
                id,
                expected,
                actual: lead.status,
            });
        }

        changes.apply_to(lead);
        lead.updated_at = Utc::now();
        Ok(lead.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_online()?;

        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| l.id != id);

        if leads.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead(name: &str) -> NewLead {
        NewLead {
            name: name.to_string(),
            role: "CTO".to_string(),
            company: "Acme".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_draft() {
        let store = MemoryLeadStore::new();
        let lead = store.create(new_lead("Alex")).await.unwrap();

        assert_eq!(lead.status, LeadStatus::Draft);
        assert_eq!(lead.created_at, lead.updated_at);
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_status() {
        let store = MemoryLeadStore::new();
        let mut input = new_lead("Alex");
        input.status = Some(LeadStatus::Approved);

        let lead = store.create(input).await.unwrap();
        assert_eq!(lead.status, LeadStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryLeadStore::new();
        store.create(new_lead("First")).await.unwrap();
        store.create(new_lead("Second")).await.unwrap();
        store.create(new_lead("Third")).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_identity() {
        let store = MemoryLeadStore::new();
        let created = store.create(new_lead("Alex")).await.unwrap();

        let updated = store
            .update(created.id, LeadUpdate::status(LeadStatus::Approved))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Alex");
        assert_eq!(updated.status, LeadStatus::Approved);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryLeadStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            store.update(id, LeadUpdate::default()).await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = MemoryLeadStore::new();
        let lead = store.create(new_lead("Alex")).await.unwrap();

        assert_eq!(store.get(lead.id).await.unwrap(), lead);
        assert!(matches!(
            store.get(Uuid::new_v4()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = MemoryLeadStore::new();
        let lead = store.create(new_lead("Alex")).await.unwrap();

        store.delete(lead.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryLeadStore::new();
        store.set_offline(true);

        assert!(matches!(store.list().await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.create(new_lead("Alex")).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_offline(false);
        assert!(store.list().await.is_ok());
    }

    #[tokio::test]
    async fn test_update_if_status_checks_current_status() {
        let store = MemoryLeadStore::new();
        let lead = store.create(new_lead("Alex")).await.unwrap();

        let approved = store
            .update_if_status(lead.id, LeadStatus::Draft, LeadUpdate::status(LeadStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.status, LeadStatus::Approved);

        // A second writer that still believes the lead is Draft loses.
        let stale = store
            .update_if_status(lead.id, LeadStatus::Draft, LeadUpdate::status(LeadStatus::Approved))
            .await;
        assert!(matches!(
            stale,
            Err(StoreError::StatusChanged {
                expected: LeadStatus::Draft,
                actual: LeadStatus::Approved,
                ..
            })
        ));

        assert!(matches!(
            store
                .update_if_status(Uuid::new_v4(), LeadStatus::Draft, LeadUpdate::default())
                .await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_follows_connectivity() {
        let store = MemoryLeadStore::new();
        assert!(store.ping().await.is_ok());

        store.set_offline(true);
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row = LeadRow {
            id: Uuid::new_v4(),
            name: "Alex".into(),
            role: "CTO".into(),
            company: "Acme".into(),
            linkedin_url: None,
            message: None,
            status: "Archived".into(),
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(Lead::try_from(row), Err(StoreError::InvalidRow(_))));
    }
}
