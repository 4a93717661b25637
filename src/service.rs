use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{ObjectStorage, Store};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{access, InvoiceFilter, LedgerData, Notifications, ScopedInvoice, Totals};
use crate::models::{InvoiceChanges, NewInvoice, NewInvoiceFile, NewPayrollEntry, NewProject, SessionUser};
use crate::session::Session;
use crate::storage::{upload_path, Attachment};

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Client-side view of the ledger plus every mutation a user can make.
///
/// Permissions are checked here before anything reaches the backend. Each
/// successful mutation is followed by a full reload; nothing is patched
/// locally. Operations on a folder, invoice or file that is not in the loaded
/// data do nothing.
pub struct Ledger {
    store: Arc<dyn Store>,
    storage: Arc<dyn ObjectStorage>,
    session: Arc<Session>,
    data: LedgerData,
    clock: Clock,
}

impl Ledger {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn ObjectStorage>, session: Arc<Session>) -> Self {
        Self {
            store,
            storage,
            session,
            data: LedgerData::default(),
            clock: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replace the source of "today", used for paid dates and overdue checks.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn data(&self) -> &LedgerData {
        &self.data
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn viewer(&self) -> LedgerResult<SessionUser> {
        self.session.current_user().ok_or(LedgerError::NotSignedIn)
    }

    /// Forget everything loaded for the previous user.
    pub fn clear(&mut self) {
        self.data = LedgerData::default();
    }

    pub async fn reload(&mut self) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let (projects, invoices, payroll, files) = tokio::try_join!(
            self.store.projects(),
            self.store.invoices(),
            self.store.payroll_entries(),
            self.store.invoice_files(),
        )?;

        self.data = LedgerData::assemble(&viewer, projects, invoices, payroll, files);
        debug!(
            folders = self.data.folders.len(),
            invoices = self.data.all_invoices().len(),
            "ledger reloaded"
        );
        Ok(())
    }

    // Derived views

    pub fn filtered_invoices(&self, filter: &InvoiceFilter) -> Vec<ScopedInvoice> {
        filter.apply(&self.data.all_invoices())
    }

    pub fn totals(&self, filter: &InvoiceFilter) -> Totals {
        let filtered = self.filtered_invoices(filter);
        Totals::compute(filtered.iter().map(|s| &s.invoice), self.today())
    }

    pub fn notifications(&self) -> Notifications {
        Notifications::collect(&self.data.all_invoices(), self.today())
    }

    // Projects

    pub async fn create_project(&mut self, name: &str) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        if !access::can_mutate_folder(&viewer) {
            return Err(forbidden("create projects"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        let id = self
            .store
            .insert_project(&NewProject {
                name: name.to_string(),
                created_by: viewer.id,
                created_by_email: viewer.email.clone(),
            })
            .await?;
        info!(%id, name, "project created");

        self.reload().await
    }

    pub async fn toggle_project_active(&mut self, folder_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some(folder) = self.data.folder(folder_id) else {
            return Ok(());
        };
        if !access::can_mutate_folder(&viewer) {
            return Err(forbidden("change project status"));
        }

        let active = !folder.is_active;
        self.store.set_project_active(folder_id, active).await?;
        info!(%folder_id, active, "project status changed");

        self.reload().await
    }

    pub async fn delete_folder(&mut self, folder_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        if self.data.folder(folder_id).is_none() {
            return Ok(());
        }
        if !access::can_mutate_folder(&viewer) {
            return Err(forbidden("delete projects"));
        }

        self.store.delete_project(folder_id).await?;
        info!(%folder_id, "project deleted");

        self.reload().await
    }

    // Invoices

    pub async fn add_invoice(
        &mut self,
        folder_id: Uuid,
        amount: f64,
        expected_payment_date: Option<NaiveDate>,
        attachment: Option<Attachment>,
    ) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount);
        }
        let Some(folder) = self.data.folder(folder_id) else {
            return Ok(());
        };
        if !access::can_add_invoice(&viewer, folder) {
            return Err(LedgerError::InactiveProject);
        }

        let (image_name, image_path, image_url) = match attachment {
            Some(file) => match self.upload(&viewer, file.bytes, &file.name).await {
                Some((path, url)) => (Some(file.name), Some(path), Some(url)),
                None => (None, None, None),
            },
            None => (None, None, None),
        };

        let id = self
            .store
            .insert_invoice(&NewInvoice {
                project_id: folder_id,
                amount,
                date: self.today(),
                expected_payment_date,
                created_by: viewer.id,
                created_by_email: viewer.email.clone(),
                image_name,
                image_path,
                image_url,
            })
            .await?;
        info!(%id, %folder_id, amount, "invoice added");

        self.reload().await
    }

    pub async fn update_invoice(&mut self, invoice_id: Uuid, changes: InvoiceChanges) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((_, invoice)) = self.data.invoice(invoice_id) else {
            return Ok(());
        };
        if !access::can_edit_invoice(&viewer, invoice) {
            return Err(forbidden("edit this invoice"));
        }
        if changes.amount.is_some_and(|amount| !amount.is_finite() || amount < 0.0) {
            return Err(LedgerError::InvalidAmount);
        }

        self.store.update_invoice(invoice_id, &changes).await?;
        info!(%invoice_id, "invoice updated");

        self.reload().await
    }

    pub async fn delete_invoice(&mut self, invoice_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((_, invoice)) = self.data.invoice(invoice_id) else {
            return Ok(());
        };
        if !access::can_delete_invoice(&viewer, invoice) {
            return Err(forbidden("delete this invoice"));
        }

        self.store.delete_invoice(invoice_id).await?;
        info!(%invoice_id, "invoice deleted");

        self.reload().await
    }

    /// Flip the paid flag. Becoming paid stamps today's date; either way the
    /// invoice counts as seen.
    pub async fn toggle_paid(&mut self, invoice_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((_, invoice)) = self.data.invoice(invoice_id) else {
            return Ok(());
        };
        if !access::can_toggle_paid(&viewer) {
            return Err(forbidden("change paid status"));
        }

        let paid = !invoice.paid;
        let paid_at = paid.then(|| self.today());
        self.store.set_invoice_paid(invoice_id, paid, paid_at).await?;
        info!(%invoice_id, paid, "paid status changed");

        self.reload().await
    }

    pub async fn mark_seen(&mut self, invoice_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        if self.data.invoice(invoice_id).is_none() {
            return Ok(());
        }
        if !access::can_mark_seen(&viewer) {
            return Err(forbidden("mark invoices as seen"));
        }

        self.store.mark_invoice_seen(invoice_id).await?;

        self.reload().await
    }

    // Attachments

    pub async fn add_invoice_file(&mut self, invoice_id: Uuid, attachment: Attachment) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((_, invoice)) = self.data.invoice(invoice_id) else {
            return Ok(());
        };
        if !access::can_edit_invoice(&viewer, invoice) {
            return Err(forbidden("attach files to this invoice"));
        }

        let Some((path, url)) = self.upload(&viewer, attachment.bytes, &attachment.name).await else {
            return Err(LedgerError::Storage("File upload failed".to_string()));
        };

        self.store
            .insert_invoice_file(&NewInvoiceFile {
                invoice_id,
                file_name: attachment.name,
                file_path: path,
                file_url: url,
                created_by: viewer.id,
            })
            .await?;
        info!(%invoice_id, "file attached");

        self.reload().await
    }

    pub async fn delete_invoice_file(&mut self, file_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((invoice, file)) = self.data.file(file_id) else {
            return Ok(());
        };
        if !access::can_edit_invoice(&viewer, invoice) {
            return Err(forbidden("remove files from this invoice"));
        }

        self.remove_object(&file.path).await;
        self.store.delete_invoice_file(file_id).await?;
        info!(%file_id, "file removed");

        self.reload().await
    }

    pub async fn delete_legacy_file(&mut self, invoice_id: Uuid) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        let Some((_, invoice)) = self.data.invoice(invoice_id) else {
            return Ok(());
        };
        let Some(image) = &invoice.legacy_image else {
            return Ok(());
        };
        if !access::can_edit_invoice(&viewer, invoice) {
            return Err(forbidden("remove files from this invoice"));
        }

        let path = image.path.clone();
        self.remove_object(&path).await;
        self.store.clear_invoice_image(invoice_id).await?;
        info!(%invoice_id, "legacy image removed");

        self.reload().await
    }

    // Payroll

    pub async fn add_payroll(&mut self, folder_id: Uuid, amount: f64) -> LedgerResult<()> {
        let viewer = self.viewer()?;
        if !access::can_add_payroll(&viewer) {
            return Err(forbidden("add payroll"));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount);
        }
        if self.data.folder(folder_id).is_none() {
            return Ok(());
        }

        self.store
            .insert_payroll_entry(&NewPayrollEntry {
                project_id: folder_id,
                amount,
                created_by: viewer.id,
            })
            .await?;
        info!(%folder_id, amount, "payroll entry added");

        self.reload().await
    }

    /// Upload under a fresh collision-free name. A failed upload is logged and
    /// reported as `None`.
    async fn upload(&self, viewer: &SessionUser, bytes: Vec<u8>, name: &str) -> Option<(String, String)> {
        let path = upload_path(viewer.id, name);
        match self.storage.upload(&path, bytes).await {
            Ok(()) => {
                let url = self.storage.public_url(&path);
                Some((path, url))
            }
            Err(e) => {
                warn!(%path, error = %e, "upload failed");
                None
            }
        }
    }

    async fn remove_object(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        if let Err(e) = self.storage.remove(vec![path.to_string()]).await {
            warn!(path, error = %e, "could not remove stored object");
        }
    }
}

fn forbidden(action: &'static str) -> LedgerError {
    warn!(action, "permission denied");
    LedgerError::Forbidden(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAuthProvider, MockObjectStorage, MockStore};
    use crate::ledger::folders::fixtures::{file, invoice, payroll, project};
    use crate::models::{AuthUser, Invoice, InvoiceFile, PayrollEntry, Project, Role};
    use mockall::predicate::{always, eq};

    const ADMIN: &str = "boss@example.com";
    const CREW: &str = "crew@example.com";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()
    }

    async fn session(email: &str) -> (Arc<Session>, SessionUser) {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .returning(|email, _| Ok(AuthUser { id: Uuid::new_v4(), email: email.to_string() }));
        let session = Arc::new(Session::new(Arc::new(auth), vec![ADMIN.to_string()]));
        let user = session.sign_in(email, "pw").await.unwrap();
        (session, user)
    }

    #[derive(Clone, Default)]
    struct Rows {
        projects: Vec<Project>,
        invoices: Vec<Invoice>,
        payroll: Vec<PayrollEntry>,
        files: Vec<InvoiceFile>,
    }

    fn expect_reloads(store: &mut MockStore, rows: &Rows, times: usize) {
        let r = rows.clone();
        store.expect_projects().times(times).returning(move || Ok(r.projects.clone()));
        let r = rows.clone();
        store.expect_invoices().times(times).returning(move || Ok(r.invoices.clone()));
        let r = rows.clone();
        store.expect_payroll_entries().times(times).returning(move || Ok(r.payroll.clone()));
        let r = rows.clone();
        store.expect_invoice_files().times(times).returning(move || Ok(r.files.clone()));
    }

    async fn loaded(
        store: MockStore,
        storage: MockObjectStorage,
        session: Arc<Session>,
    ) -> Ledger {
        let mut ledger = Ledger::new(Arc::new(store), Arc::new(storage), session).with_clock(today);
        ledger.reload().await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn reload_requires_a_session() {
        let auth = MockAuthProvider::new();
        let session = Arc::new(Session::new(Arc::new(auth), vec![]));
        let mut ledger = Ledger::new(
            Arc::new(MockStore::new()),
            Arc::new(MockObjectStorage::new()),
            session,
        );

        assert!(matches!(ledger.reload().await, Err(LedgerError::NotSignedIn)));
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_data() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let rows = Rows {
            projects: vec![p.clone()],
            invoices: vec![invoice(&p, 10.0, &admin)],
            ..Default::default()
        };

        let mut store = MockStore::new();
        let r = rows.clone();
        let mut calls = 0;
        store.expect_projects().times(2).returning(move || {
            calls += 1;
            if calls == 1 { Ok(r.projects.clone()) } else { Err(LedgerError::Storage("down".into())) }
        });
        let r = rows.clone();
        store.expect_invoices().returning(move || Ok(r.invoices.clone()));
        store.expect_payroll_entries().returning(|| Ok(vec![]));
        store.expect_invoice_files().returning(|| Ok(vec![]));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        assert!(ledger.reload().await.is_err());
        assert_eq!(ledger.data().folders.len(), 1);
    }

    #[tokio::test]
    async fn admin_creates_trimmed_project_then_reloads() {
        let (session, admin) = session(ADMIN).await;
        let mut store = MockStore::new();
        expect_reloads(&mut store, &Rows::default(), 2);
        let expected = NewProject {
            name: "Depot".to_string(),
            created_by: admin.id,
            created_by_email: ADMIN.to_string(),
        };
        store.expect_insert_project()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        ledger.create_project("  Depot ").await.unwrap();
    }

    #[tokio::test]
    async fn regular_users_cannot_touch_folders_or_payroll() {
        let (session, _) = session(CREW).await;
        let p = project("Main St");
        let rows = Rows { projects: vec![p.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);
        store.expect_insert_project().never();
        store.expect_delete_project().never();
        store.expect_set_project_active().never();
        store.expect_insert_payroll_entry().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        assert!(matches!(ledger.create_project("X").await, Err(LedgerError::Forbidden(_))));
        assert!(matches!(ledger.delete_folder(p.id).await, Err(LedgerError::Forbidden(_))));
        assert!(matches!(ledger.toggle_project_active(p.id).await, Err(LedgerError::Forbidden(_))));
        assert!(matches!(ledger.add_payroll(p.id, 100.0).await, Err(LedgerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn empty_project_name_is_rejected() {
        let (session, _) = session(ADMIN).await;
        let mut store = MockStore::new();
        expect_reloads(&mut store, &Rows::default(), 1);
        store.expect_insert_project().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        assert!(matches!(ledger.create_project("   ").await, Err(LedgerError::EmptyName)));
    }

    #[tokio::test]
    async fn toggling_project_flips_current_state() {
        let (session, _) = session(ADMIN).await;
        let mut p = project("Main St");
        p.is_active = Some(true);
        let rows = Rows { projects: vec![p.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 2);
        store.expect_set_project_active()
            .with(eq(p.id), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        ledger.toggle_project_active(p.id).await.unwrap();
    }

    #[tokio::test]
    async fn missing_targets_are_silent_no_ops() {
        let (session, _) = session(ADMIN).await;
        let mut store = MockStore::new();
        expect_reloads(&mut store, &Rows::default(), 1);

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        let ghost = Uuid::new_v4();
        ledger.delete_folder(ghost).await.unwrap();
        ledger.toggle_project_active(ghost).await.unwrap();
        ledger.delete_invoice(ghost).await.unwrap();
        ledger.toggle_paid(ghost).await.unwrap();
        ledger.mark_seen(ghost).await.unwrap();
        ledger.delete_invoice_file(ghost).await.unwrap();
        ledger.delete_legacy_file(ghost).await.unwrap();
        ledger.add_invoice(ghost, 10.0, None, None).await.unwrap();
        ledger.add_payroll(ghost, 10.0).await.unwrap();
    }

    #[tokio::test]
    async fn add_invoice_uploads_attachment_and_stamps_today() {
        let (session, crew) = session(CREW).await;
        let p = project("Main St");
        let rows = Rows { projects: vec![p.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 2);

        let user_id = crew.id;
        let project_id = p.id;
        store.expect_insert_invoice()
            .withf(move |new: &NewInvoice| {
                new.project_id == project_id
                    && new.amount == 125.5
                    && new.date == today()
                    && new.expected_payment_date == NaiveDate::from_ymd_opt(2026, 8, 1)
                    && new.created_by == user_id
                    && new.created_by_email == CREW
                    && new.image_name.as_deref() == Some("scan.pdf")
                    && new.image_path.as_deref().is_some_and(|p| p.starts_with(&user_id.to_string()) && p.ends_with(".pdf"))
                    && new.image_url.as_deref().is_some_and(|u| u.starts_with("https://files/"))
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut storage = MockObjectStorage::new();
        storage.expect_upload()
            .with(always(), eq(b"pdf".to_vec()))
            .times(1)
            .returning(|_, _| Ok(()));
        storage.expect_public_url()
            .returning(|path| format!("https://files/{path}"));

        let mut ledger = loaded(store, storage, session).await;
        ledger
            .add_invoice(
                p.id,
                125.5,
                NaiveDate::from_ymd_opt(2026, 8, 1),
                Some(Attachment { name: "scan.pdf".to_string(), bytes: b"pdf".to_vec() }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_upload_still_records_invoice_without_image() {
        let (session, _) = session(CREW).await;
        let p = project("Main St");
        let rows = Rows { projects: vec![p.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 2);
        store.expect_insert_invoice()
            .withf(|new: &NewInvoice| new.image_name.is_none() && new.image_path.is_none() && new.image_url.is_none())
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut storage = MockObjectStorage::new();
        storage.expect_upload()
            .returning(|_, _| Err(LedgerError::Storage("exists".into())));

        let mut ledger = loaded(store, storage, session).await;
        let attachment = Attachment { name: "a.png".to_string(), bytes: vec![1] };
        ledger.add_invoice(p.id, 10.0, None, Some(attachment)).await.unwrap();
    }

    #[tokio::test]
    async fn add_invoice_rejects_inactive_projects_and_bad_amounts() {
        let (session, _) = session(ADMIN).await;
        let mut inactive = project("Closed");
        inactive.is_active = Some(false);
        let open = project("Open");
        let rows = Rows { projects: vec![inactive.clone(), open.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);
        store.expect_insert_invoice().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        let err = ledger.add_invoice(inactive.id, 10.0, None, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::InactiveProject));
        for amount in [0.0, -5.0, f64::NAN] {
            let err = ledger.add_invoice(open.id, amount, None, None).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount));
        }
    }

    #[tokio::test]
    async fn creators_update_and_delete_their_unpaid_invoices() {
        let (session, crew) = session(CREW).await;
        let p = project("Main St");
        let mine = invoice(&p, 50.0, &crew);
        let rows = Rows { projects: vec![p.clone()], invoices: vec![mine.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 3);
        let changes = InvoiceChanges {
            amount: Some(75.0),
            expected_payment_date: Some(None),
            ..Default::default()
        };
        store.expect_update_invoice()
            .with(eq(mine.id), eq(changes.clone()))
            .times(1)
            .returning(|_, _| Ok(()));
        store.expect_delete_invoice()
            .with(eq(mine.id))
            .times(1)
            .returning(|_| Ok(()));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        ledger.update_invoice(mine.id, changes).await.unwrap();
        ledger.delete_invoice(mine.id).await.unwrap();
    }

    #[tokio::test]
    async fn paid_invoices_are_frozen_even_for_admins() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let mut paid = invoice(&p, 50.0, &admin);
        paid.paid = true;
        let rows = Rows { projects: vec![p], invoices: vec![paid.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);
        store.expect_update_invoice().never();
        store.expect_delete_invoice().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        let changes = InvoiceChanges { amount: Some(1.0), ..Default::default() };
        assert!(matches!(ledger.update_invoice(paid.id, changes).await, Err(LedgerError::Forbidden(_))));
        assert!(matches!(ledger.delete_invoice(paid.id).await, Err(LedgerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn negative_amount_updates_are_rejected() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let inv = invoice(&p, 50.0, &admin);
        let rows = Rows { projects: vec![p], invoices: vec![inv.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);
        store.expect_update_invoice().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        let changes = InvoiceChanges { amount: Some(-1.0), ..Default::default() };
        assert!(matches!(ledger.update_invoice(inv.id, changes).await, Err(LedgerError::InvalidAmount)));
    }

    #[tokio::test]
    async fn toggle_paid_sets_and_clears_paid_date() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let open = invoice(&p, 10.0, &admin);
        let mut settled = invoice(&p, 20.0, &admin);
        settled.paid = true;
        settled.paid_at = Some(today());
        let rows = Rows {
            projects: vec![p],
            invoices: vec![open.clone(), settled.clone()],
            ..Default::default()
        };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 3);
        store.expect_set_invoice_paid()
            .with(eq(open.id), eq(true), eq(Some(today())))
            .times(1)
            .returning(|_, _, _| Ok(()));
        store.expect_set_invoice_paid()
            .with(eq(settled.id), eq(false), eq(None::<NaiveDate>))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        ledger.toggle_paid(open.id).await.unwrap();
        ledger.toggle_paid(settled.id).await.unwrap();
    }

    #[tokio::test]
    async fn regular_users_cannot_toggle_paid_or_mark_seen() {
        let (session, crew) = session(CREW).await;
        let p = project("Main St");
        let mine = invoice(&p, 10.0, &crew);
        let rows = Rows { projects: vec![p], invoices: vec![mine.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);
        store.expect_set_invoice_paid().never();
        store.expect_mark_invoice_seen().never();

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        assert!(matches!(ledger.toggle_paid(mine.id).await, Err(LedgerError::Forbidden(_))));
        assert!(matches!(ledger.mark_seen(mine.id).await, Err(LedgerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn attaching_a_file_requires_a_successful_upload() {
        let (session, crew) = session(CREW).await;
        let p = project("Main St");
        let mine = invoice(&p, 10.0, &crew);
        let rows = Rows { projects: vec![p], invoices: vec![mine.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 2);
        let invoice_id = mine.id;
        store.expect_insert_invoice_file()
            .withf(move |f: &NewInvoiceFile| {
                f.invoice_id == invoice_id && f.file_name == "receipt.jpg" && f.file_url == format!("https://files/{}", f.file_path)
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut storage = MockObjectStorage::new();
        let mut uploads = 0;
        storage.expect_upload().times(2).returning(move |_, _| {
            uploads += 1;
            if uploads == 1 { Ok(()) } else { Err(LedgerError::Storage("quota".into())) }
        });
        storage.expect_public_url().returning(|path| format!("https://files/{path}"));

        let mut ledger = loaded(store, storage, session).await;
        let receipt = Attachment { name: "receipt.jpg".to_string(), bytes: vec![0xff] };
        ledger.add_invoice_file(mine.id, receipt.clone()).await.unwrap();

        let err = ledger.add_invoice_file(mine.id, receipt).await.unwrap_err();
        assert_eq!(err.to_string(), "Storage error: File upload failed");
    }

    #[tokio::test]
    async fn deleting_files_removes_objects_best_effort() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let mut inv = invoice(&p, 10.0, &admin);
        inv.image_name = Some("old.png".to_string());
        inv.image_path = Some("u/old.png".to_string());
        inv.image_url = Some("https://files/u/old.png".to_string());
        let attached = file(&inv, "new.pdf");
        let rows = Rows {
            projects: vec![p.clone()],
            invoices: vec![inv.clone()],
            payroll: vec![payroll(&p, 5.0)],
            files: vec![attached.clone()],
        };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 3);
        store.expect_delete_invoice_file().with(eq(attached.id)).times(1).returning(|_| Ok(()));
        store.expect_clear_invoice_image().with(eq(inv.id)).times(1).returning(|_| Ok(()));

        let mut storage = MockObjectStorage::new();
        storage.expect_remove()
            .with(eq(vec!["u/new.pdf".to_string()]))
            .times(1)
            .returning(|_| Err(LedgerError::Storage("gone".into())));
        storage.expect_remove()
            .with(eq(vec!["u/old.png".to_string()]))
            .times(1)
            .returning(|_| Ok(()));

        let mut ledger = loaded(store, storage, session).await;
        ledger.delete_invoice_file(attached.id).await.unwrap();
        ledger.delete_legacy_file(inv.id).await.unwrap();
    }

    #[tokio::test]
    async fn admin_adds_payroll_with_positive_amounts_only() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let rows = Rows { projects: vec![p.clone()], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 2);
        store.expect_insert_payroll_entry()
            .with(eq(NewPayrollEntry { project_id: p.id, amount: 900.0, created_by: admin.id }))
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut ledger = loaded(store, MockObjectStorage::new(), session).await;
        assert!(matches!(ledger.add_payroll(p.id, 0.0).await, Err(LedgerError::InvalidAmount)));
        ledger.add_payroll(p.id, 900.0).await.unwrap();
    }

    #[tokio::test]
    async fn derived_views_use_the_ledger_clock() {
        let (session, admin) = session(ADMIN).await;
        let p = project("Main St");
        let mut late = invoice(&p, 40.0, &admin);
        late.expected_payment_date = today().pred_opt();
        let mut due = invoice(&p, 60.0, &admin);
        due.expected_payment_date = Some(today());
        due.seen_by_admin = true;
        let rows = Rows { projects: vec![p], invoices: vec![late, due], ..Default::default() };
        let mut store = MockStore::new();
        expect_reloads(&mut store, &rows, 1);

        let ledger = loaded(store, MockObjectStorage::new(), session).await;
        let totals = ledger.totals(&InvoiceFilter::default());
        assert_eq!(totals.unpaid, 100.0);
        assert_eq!(totals.overdue, 40.0);

        let inbox = ledger.notifications();
        assert_eq!(inbox.unseen.len(), 1);
        assert_eq!(inbox.due_today.len(), 1);
        assert_eq!(ledger.viewer().unwrap().role, Role::Admin);
    }
}
