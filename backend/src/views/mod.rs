// src/views/mod.rs
//
// Presentation-independent view models: what the intake form, the leads table
// and the leads board do, without any rendering.

pub mod board;
pub mod form;
pub mod list;
pub mod notice;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use board::{BoardColumn, DropTarget, LeadsBoard};
pub use form::{Field, FieldErrors, LeadForm};
pub use list::{LeadList, LeadListSnapshot, LeadsView};
pub use notice::{Notice, NoticeKind};
pub use table::{LeadsTable, TableRow};
