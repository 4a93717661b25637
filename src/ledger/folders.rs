use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Invoice, InvoiceFile, PayrollEntry, Project, SessionUser};

#[derive(Debug, Clone, PartialEq)]
pub struct AttachedFile {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub url: String,
}

/// The legacy single image stored directly on an invoice row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyImage {
    pub name: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceView {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_on: NaiveDate,
    pub expected_payment_date: Option<NaiveDate>,
    pub paid: bool,
    pub paid_at: Option<NaiveDate>,
    pub seen_by_admin: bool,
    pub created_by_email: String,
    pub legacy_image: Option<LegacyImage>,
    pub files: Vec<AttachedFile>,
}

impl InvoiceView {
    /// Attached files plus the legacy image, if any.
    pub fn file_count(&self) -> usize {
        self.files.len() + usize::from(self.legacy_image.is_some())
    }

    fn from_row(invoice: &Invoice, files: &[InvoiceFile]) -> Self {
        let legacy_image = invoice
            .image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| LegacyImage {
                name: invoice.image_name.clone().unwrap_or_default(),
                path: invoice.image_path.clone().unwrap_or_default(),
                url: url.to_string(),
            });

        Self {
            id: invoice.id,
            amount: invoice.amount,
            date: invoice.date,
            created_on: invoice.created_at.date_naive(),
            expected_payment_date: invoice.expected_payment_date,
            paid: invoice.paid,
            paid_at: invoice.paid_at,
            seen_by_admin: invoice.seen_by_admin,
            created_by_email: invoice.created_by_email.clone().unwrap_or_default(),
            legacy_image,
            files: files
                .iter()
                .filter(|file| file.invoice_id == invoice.id)
                .map(|file| AttachedFile {
                    id: file.id,
                    name: file.file_name.clone(),
                    path: file.file_path.clone(),
                    url: file.file_url.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub owner_email: String,
    pub is_active: bool,
    pub invoices: Vec<InvoiceView>,
    pub payroll: Vec<PayrollEntry>,
}

impl Folder {
    pub fn payroll_total(&self) -> f64 {
        self.payroll.iter().map(|entry| entry.amount).sum()
    }

    pub fn invoice(&self, id: Uuid) -> Option<&InvoiceView> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }
}

/// An invoice flattened out of its folder.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedInvoice {
    pub folder_id: Uuid,
    pub folder_name: String,
    pub owner_email: String,
    pub invoice: InvoiceView,
}

/// Everything the screens render, rebuilt from scratch after every reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerData {
    pub folders: Vec<Folder>,
}

impl LedgerData {
    /// Group the four table snapshots into folders.
    ///
    /// Regular users only get the invoices they created; admins get all of them.
    pub fn assemble(
        viewer: &SessionUser,
        projects: Vec<Project>,
        invoices: Vec<Invoice>,
        payroll: Vec<PayrollEntry>,
        files: Vec<InvoiceFile>,
    ) -> Self {
        let visible: Vec<&Invoice> = invoices
            .iter()
            .filter(|invoice| viewer.is_admin() || invoice.created_by == Some(viewer.id))
            .collect();

        let folders = projects
            .iter()
            .map(|project| Folder {
                id: project.id,
                name: project.name.clone(),
                owner_email: project.owner_email().to_string(),
                is_active: project.active(),
                invoices: visible
                    .iter()
                    .filter(|invoice| invoice.project_id == project.id)
                    .map(|invoice| InvoiceView::from_row(invoice, &files))
                    .collect(),
                payroll: payroll
                    .iter()
                    .filter(|entry| entry.project_id == project.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        Self { folders }
    }

    pub fn folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == id)
    }

    /// Find an invoice and the folder holding it.
    pub fn invoice(&self, id: Uuid) -> Option<(&Folder, &InvoiceView)> {
        self.folders
            .iter()
            .find_map(|folder| folder.invoice(id).map(|invoice| (folder, invoice)))
    }

    /// Find an attached file and the invoice it belongs to.
    pub fn file(&self, id: Uuid) -> Option<(&InvoiceView, &AttachedFile)> {
        self.folders.iter().flat_map(|f| f.invoices.iter()).find_map(|invoice| {
            invoice
                .files
                .iter()
                .find(|file| file.id == id)
                .map(|file| (invoice, file))
        })
    }

    pub fn all_invoices(&self) -> Vec<ScopedInvoice> {
        self.folders
            .iter()
            .flat_map(|folder| {
                folder.invoices.iter().map(move |invoice| ScopedInvoice {
                    folder_id: folder.id,
                    folder_name: folder.name.clone(),
                    owner_email: folder.owner_email.clone(),
                    invoice: invoice.clone(),
                })
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.folders.iter().filter(|f| f.is_active).count()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Role;

    pub fn user(role: Role) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: match role {
                Role::Admin => "boss@example.com".to_string(),
                Role::Regular => "crew@example.com".to_string(),
            },
            role,
        }
    }

    pub fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_by: None,
            created_by_email: Some("boss@example.com".to_string()),
            is_active: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap(),
        }
    }

    pub fn invoice(project: &Project, amount: f64, creator: &SessionUser) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            project_id: project.id,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            expected_payment_date: None,
            paid: false,
            paid_at: None,
            seen_by_admin: false,
            created_by: Some(creator.id),
            created_by_email: Some(creator.email.clone()),
            image_name: None,
            image_path: None,
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).unwrap(),
        }
    }

    pub fn payroll(project: &Project, amount: f64) -> PayrollEntry {
        PayrollEntry {
            id: Uuid::new_v4(),
            project_id: project.id,
            amount,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
        }
    }

    pub fn file(invoice: &Invoice, name: &str) -> InvoiceFile {
        InvoiceFile {
            id: Uuid::new_v4(),
            invoice_id: invoice.id,
            file_name: name.to_string(),
            file_path: format!("u/{name}"),
            file_url: format!("https://files.example.com/u/{name}"),
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
        }
    }

    /// Build an invoice view directly, for the pure derivation tests.
    pub fn view(amount: f64, paid: bool) -> InvoiceView {
        InvoiceView {
            id: Uuid::new_v4(),
            amount,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            created_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            expected_payment_date: None,
            paid,
            paid_at: None,
            seen_by_admin: false,
            created_by_email: "crew@example.com".to_string(),
            legacy_image: None,
            files: Vec::new(),
        }
    }
}
