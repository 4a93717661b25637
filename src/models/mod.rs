mod project;
mod invoice;
mod invoice_file;
mod payroll_entry;
mod user;

pub use project::{Project, NewProject};
pub use invoice::{Invoice, NewInvoice, InvoiceChanges};
pub use invoice_file::{InvoiceFile, NewInvoiceFile};
pub use payroll_entry::{PayrollEntry, NewPayrollEntry};
pub use user::{AuthUser, Role, SessionUser};
