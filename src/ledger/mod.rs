//! Derived state over the loaded ledger: folder assembly, status labels,
//! totals, proportional breakdowns, filters, notifications and the
//! permission predicates the service layer enforces.

pub mod access;
pub mod breakdown;
pub mod filters;
pub mod folders;
pub mod notifications;
pub mod status;
pub mod totals;

pub use breakdown::Breakdown;
pub use filters::{InvoiceFilter, StatusFilter};
pub use notifications::Notifications;
pub use folders::{AttachedFile, Folder, InvoiceView, LedgerData, LegacyImage, ScopedInvoice};
pub use status::FolderStatus;
pub use totals::Totals;
