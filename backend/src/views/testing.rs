// Test doubles shared by the view tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::ai::{GenerationError, MessageGenerator};
use crate::leads::{Lead, LeadStatus, LeadStore, LeadUpdate, MemoryLeadStore, NewLead, StoreError};

pub fn lead(name: &str, status: LeadStatus) -> Lead {
    let now = Utc::now();
    Lead {
        id: Uuid::new_v4(),
        name: name.to_string(),
        role: "CTO".to_string(),
        company: "Acme".to_string(),
        linkedin_url: None,
        message: None,
        status,
        created_at: now,
        updated_at: now,
    }
}

/// Insert one Draft lead per name; ids come back in insertion order.
pub async fn seed(store: &dyn LeadStore, names: &[&str]) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let lead = store
            .create(NewLead {
                name: name.to_string(),
                role: "CTO".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        ids.push(lead.id);
    }
    ids
}

/// Memory store that counts calls and can hold updates for one row until released.
#[derive(Default)]
pub struct GatedStore {
    pub inner: MemoryLeadStore,
    pub entered: Notify,
    pub release: Notify,
    gated: Mutex<Option<Uuid>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self, id: Uuid) {
        *self.gated.lock() = Some(id);
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Both plain and status-checked updates count.
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    async fn hold(&self, id: Uuid) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let gated = *self.gated.lock() == Some(id);
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl LeadStore for GatedStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(lead).await
    }

    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        self.inner.list().await
    }

    async fn get(&self, id: Uuid) -> Result<Lead, StoreError> {
        self.inner.get(id).await
    }

    async fn update(&self, id: Uuid, changes: LeadUpdate) -> Result<Lead, StoreError> {
        self.hold(id).await;
        self.inner.update(id, changes).await
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: LeadStatus,
        changes: LeadUpdate,
    ) -> Result<Lead, StoreError> {
        self.hold(id).await;
        self.inner.update_if_status(id, expected, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    fn kind(&self) -> &'static str {
        "gated"
    }
}

/// Generator returning a fixed reply, or failing when `reply` is `None`.
pub struct StubGenerator {
    pub reply: Option<String>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageGenerator for StubGenerator {
    async fn generate(
        &self,
        _name: &str,
        _role: &str,
        _company: &str,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerationError::Endpoint {
                status: 500,
                body: "stub failure".to_string(),
            }),
        }
    }
}
