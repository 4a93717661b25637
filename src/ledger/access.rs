//! Who may do what. Every predicate here is checked by the service layer
//! before a backend call goes out.

use super::folders::{Folder, InvoiceView};
use crate::models::SessionUser;

/// Unpaid invoices can be edited by admins and by the user who created them.
pub fn can_edit_invoice(viewer: &SessionUser, invoice: &InvoiceView) -> bool {
    !invoice.paid && (viewer.is_admin() || invoice.created_by_email == viewer.email)
}

pub fn can_delete_invoice(viewer: &SessionUser, invoice: &InvoiceView) -> bool {
    can_edit_invoice(viewer, invoice)
}

pub fn can_add_invoice(_viewer: &SessionUser, folder: &Folder) -> bool {
    folder.is_active
}

pub fn can_toggle_paid(viewer: &SessionUser) -> bool {
    viewer.is_admin()
}

pub fn can_mark_seen(viewer: &SessionUser) -> bool {
    viewer.is_admin()
}

/// Creating, deleting and (de)activating projects.
pub fn can_mutate_folder(viewer: &SessionUser) -> bool {
    viewer.is_admin()
}

pub fn can_add_payroll(viewer: &SessionUser) -> bool {
    viewer.is_admin()
}
