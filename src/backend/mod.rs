//! Seams to the hosted backend: authentication, the four ledger tables and
//! attachment object storage. Postgres and filesystem implementations live in
//! `crate::db` and `crate::storage`.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::models::{
    AuthUser, Invoice, InvoiceChanges, InvoiceFile, NewInvoice, NewInvoiceFile, NewPayrollEntry,
    NewProject, PayrollEntry, Project,
};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify an email/password pair. The email is already normalised.
    async fn sign_in(&self, email: &str, password: &str) -> LedgerResult<AuthUser>;

    async fn sign_out(&self, user_id: Uuid) -> LedgerResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync {
    // Every select returns rows newest first.
    async fn projects(&self) -> LedgerResult<Vec<Project>>;
    async fn invoices(&self) -> LedgerResult<Vec<Invoice>>;
    async fn payroll_entries(&self) -> LedgerResult<Vec<PayrollEntry>>;
    async fn invoice_files(&self) -> LedgerResult<Vec<InvoiceFile>>;

    async fn insert_project(&self, project: &NewProject) -> LedgerResult<Uuid>;
    async fn set_project_active(&self, id: Uuid, active: bool) -> LedgerResult<()>;
    async fn delete_project(&self, id: Uuid) -> LedgerResult<()>;

    async fn insert_invoice(&self, invoice: &NewInvoice) -> LedgerResult<Uuid>;
    async fn update_invoice(&self, id: Uuid, changes: &InvoiceChanges) -> LedgerResult<()>;
    /// Set the paid state; also marks the invoice as seen by an admin.
    async fn set_invoice_paid(
        &self,
        id: Uuid,
        paid: bool,
        paid_at: Option<NaiveDate>,
    ) -> LedgerResult<()>;
    async fn mark_invoice_seen(&self, id: Uuid) -> LedgerResult<()>;
    /// Null out the legacy single-image columns.
    async fn clear_invoice_image(&self, id: Uuid) -> LedgerResult<()>;
    async fn delete_invoice(&self, id: Uuid) -> LedgerResult<()>;

    async fn insert_invoice_file(&self, file: &NewInvoiceFile) -> LedgerResult<Uuid>;
    async fn delete_invoice_file(&self, id: Uuid) -> LedgerResult<()>;

    async fn insert_payroll_entry(&self, entry: &NewPayrollEntry) -> LedgerResult<Uuid>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object. Uploading over an existing path is an error.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> LedgerResult<()>;

    fn public_url(&self, path: &str) -> String;

    async fn remove(&self, paths: Vec<String>) -> LedgerResult<()>;
}
