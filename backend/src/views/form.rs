// src/views/form.rs
//
// Intake form: field validation, optional message generation, submission.

use std::collections::BTreeMap;

use reqwest::Url;
use serde::Serialize;
use tracing::error;

use crate::ai::MessageGenerator;
use crate::config::Config;
use crate::leads::{Lead, LeadStore, NewLead};
use crate::views::notice::Notice;

const MIN_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Role,
    Company,
    LinkedinUrl,
}

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeadForm {
    pub name: String,
    pub role: String,
    pub company: String,
    pub linkedin_url: String,
    pub message: String,

    /// When non-empty, `role` must be one of these.
    role_options: Vec<String>,
    errors: FieldErrors,
    generating: bool,
    submitting: bool,
}

impl LeadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role_options(role_options: Vec<String>) -> Self {
        Self {
            role_options,
            ..Default::default()
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::with_role_options(cfg.role_options.clone())
    }

    pub fn role_options(&self) -> &[String] {
        &self.role_options
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Check every field and build the insert payload.
    ///
    /// No status is set: the store default applies.
    pub fn validate(&self) -> Result<NewLead, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        let role = self.role.trim();
        let company = self.company.trim();
        let linkedin_url = self.linkedin_url.trim();

        if name.chars().count() < MIN_LEN {
            errors.insert(Field::Name, "Name must be at least 2 characters.");
        }

        if !self.role_options.is_empty() {
            if !self.role_options.iter().any(|option| option == role) {
                errors.insert(Field::Role, "Please select a valid role.");
            }
        } else if role.chars().count() < MIN_LEN {
            errors.insert(Field::Role, "Role must be at least 2 characters.");
        }

        if company.chars().count() < MIN_LEN {
            errors.insert(Field::Company, "Company name must be at least 2 characters.");
        }

        if !linkedin_url.is_empty() && !is_valid_url(linkedin_url) {
            errors.insert(Field::LinkedinUrl, "Please enter a valid URL.");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let message = self.message.trim();
        Ok(NewLead {
            name: name.to_string(),
            role: role.to_string(),
            company: company.to_string(),
            linkedin_url: (!linkedin_url.is_empty()).then(|| linkedin_url.to_string()),
            message: (!message.is_empty()).then(|| message.to_string()),
            status: None,
        })
    }

    /// "Generate message" is enabled once name, role and company are filled in.
    pub fn can_generate(&self) -> bool {
        !self.generating
            && !self.name.trim().is_empty()
            && !self.role.trim().is_empty()
            && !self.company.trim().is_empty()
    }

    pub async fn generate_message(&mut self, generator: &dyn MessageGenerator) -> Notice {
        if !self.can_generate() {
            return Notice::error("Please fill in name, role, and company first.");
        }

        self.generating = true;
        let result = generator
            .generate(self.name.trim(), self.role.trim(), self.company.trim())
            .await;
        self.generating = false;

        match result {
            Ok(text) => {
                self.message = text;
                Notice::success("Message generated successfully!")
            }
            Err(e) => {
                error!("Error generating message: {}", e);
                Notice::error("Failed to generate message. Please try again.")
            }
        }
    }

    /// Validate and save. On success the form is cleared; on any failure the
    /// entered values stay for correction.
    pub async fn submit(&mut self, store: &dyn LeadStore) -> Result<(Lead, Notice), Notice> {
        let new_lead = match self.validate() {
            Ok(new_lead) => {
                self.errors = FieldErrors::default();
                new_lead
            }
            Err(errors) => {
                self.errors = errors;
                return Err(Notice::error("Please fix the highlighted fields."));
            }
        };

        self.submitting = true;
        let result = store.create(new_lead).await;
        self.submitting = false;

        match result {
            Ok(lead) => {
                self.reset();
                Ok((lead, Notice::success("Lead saved successfully!")))
            }
            Err(e) => {
                error!("Error saving lead: {}", e);
                Err(Notice::error("Failed to save lead. Please try again."))
            }
        }
    }

    /// Clear every field and error, keeping the role options.
    pub fn reset(&mut self) {
        let role_options = std::mem::take(&mut self.role_options);
        *self = Self::with_role_options(role_options);
    }
}

fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
