use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Workflow stage of a lead.
///
/// Stored and serialized as the exact strings "Draft", "Approved", "Sent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    Draft,
    Approved,
    Sent,
}

impl LeadStatus {
    /// Board column order.
    pub const ALL: [LeadStatus; 3] = [LeadStatus::Draft, LeadStatus::Approved, LeadStatus::Sent];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Draft => "Draft",
            LeadStatus::Approved => "Approved",
            LeadStatus::Sent => "Sent",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(LeadStatus::Draft),
            "Approved" => Ok(LeadStatus::Approved),
            "Sent" => Ok(LeadStatus::Sent),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lead status '{0}'")]
pub struct UnknownStatus(pub String);

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub company: String,
    pub linkedin_url: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape. `status` is normally omitted so the store default applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
}

/// Partial update. Absent fields are left unchanged.
///
/// `id`, `created_at` and `updated_at` are not part of the shape, so they
/// can never be overwritten through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// `Some(None)` (an explicit JSON `null`) clears the column.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
}

/// Keep a present `null` apart from an absent field.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl LeadUpdate {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge the set fields into `lead`. Timestamps are the caller's concern.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(name) = &self.name {
            lead.name = name.clone();
        }
        if let Some(role) = &self.role {
            lead.role = role.clone();
        }
        if let Some(company) = &self.company {
            lead.company = company.clone();
        }
        if let Some(url) = &self.linkedin_url {
            lead.linkedin_url = url.clone();
        }
        if let Some(message) = &self.message {
            lead.message = message.clone();
        }
        if let Some(status) = self.status {
            lead.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(LeadStatus::Approved).unwrap(), json!("Approved"));
        let parsed: LeadStatus = serde_json::from_value(json!("Sent")).unwrap();
        assert_eq!(parsed, LeadStatus::Sent);
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(serde_json::from_value::<LeadStatus>(json!("Archived")).is_err());
        assert!(serde_json::from_value::<LeadStatus>(json!("draft")).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Approved".parse::<LeadStatus>(), Ok(LeadStatus::Approved));
        assert_eq!(
            "pending".parse::<LeadStatus>(),
            Err(UnknownStatus("pending".to_string()))
        );
    }

    #[test]
    fn test_new_lead_optional_fields() {
        let lead: NewLead = serde_json::from_value(json!({
            "name": "Alex",
            "role": "CTO",
            "company": "Acme"
        }))
        .unwrap();
        assert_eq!(lead.linkedin_url, None);
        assert_eq!(lead.status, None);
    }

    #[test]
    fn test_update_only_touches_set_fields() {
        let now = Utc::now();
        let mut lead = Lead {
            id: Uuid::new_v4(),
            name: "Alex".into(),
            role: "CTO".into(),
            company: "Acme".into(),
            linkedin_url: None,
            message: Some("hello".into()),
            status: LeadStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        let before = lead.clone();

        LeadUpdate::status(LeadStatus::Approved).apply_to(&mut lead);

        assert_eq!(lead.status, LeadStatus::Approved);
        assert_eq!(lead.name, before.name);
        assert_eq!(lead.message, before.message);
        assert_eq!(lead.id, before.id);
    }

    #[test]
    fn test_update_null_clears_but_absent_keeps() {
        let clear: LeadUpdate = serde_json::from_value(json!({ "linkedin_url": null })).unwrap();
        assert_eq!(clear.linkedin_url, Some(None));
        assert_eq!(clear.message, None);

        let now = Utc::now();
        let mut lead = Lead {
            id: Uuid::new_v4(),
            name: "Alex".into(),
            role: "CTO".into(),
            company: "Acme".into(),
            linkedin_url: Some("https://linkedin.com/in/alex".into()),
            message: Some("hello".into()),
            status: LeadStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        clear.apply_to(&mut lead);
        assert_eq!(lead.linkedin_url, None);
        assert_eq!(lead.message.as_deref(), Some("hello"));

        let set: LeadUpdate = serde_json::from_value(json!({ "message": "hi" })).unwrap();
        set.apply_to(&mut lead);
        assert_eq!(lead.message.as_deref(), Some("hi"));
    }
}
