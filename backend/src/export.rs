// src/export.rs
//
// CSV export of the lead list.

use chrono::NaiveDate;

use crate::leads::Lead;

pub const CSV_HEADER: &str = "Name,Role,Company,LinkedIn,Status,Message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

impl CsvExport {
    /// `None` for an empty list; there is nothing to download.
    pub fn from_leads(leads: &[Lead], date: NaiveDate) -> Option<Self> {
        if leads.is_empty() {
            return None;
        }

        Some(Self {
            file_name: export_file_name(date),
            contents: leads_to_csv(leads),
        })
    }
}

/// `leads_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("leads_{}.csv", date.format("%Y-%m-%d"))
}

/// Header plus one row per lead, every field quoted, rows joined by `\n`.
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut lines = Vec::with_capacity(leads.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for lead in leads {
        let fields = [
            lead.name.as_str(),
            lead.role.as_str(),
            lead.company.as_str(),
            lead.linkedin_url.as_deref().unwrap_or(""),
            lead.status.as_str(),
            lead.message.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
