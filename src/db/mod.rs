use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{AuthProvider, Store};
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AuthUser, Invoice, InvoiceChanges, InvoiceFile, NewInvoice, NewInvoiceFile, NewPayrollEntry,
    NewProject, PayrollEntry, Project,
};

const INVOICE_COLUMNS: &str = r#"
    id,
    project_id,
    COALESCE(amount::float8, 0.0) AS amount,
    "date"::date AS "date",
    expected_payment_date::date AS expected_payment_date,
    COALESCE(paid, false) AS paid,
    paid_at::date AS paid_at,
    COALESCE(seen_by_admin, false) AS seen_by_admin,
    created_by,
    created_by_email,
    image_name,
    image_path,
    image_url,
    created_at
"#;

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AuthProvider for Database {
    async fn sign_in(&self, email: &str, password: &str) -> LedgerResult<AuthUser> {
        // Passwords are bcrypt hashes verified by pgcrypto's crypt().
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT id, COALESCE(email, '') AS email
            FROM auth.users
            WHERE lower(email) = $1
              AND encrypted_password = crypt($2, encrypted_password)
            "#,
        )
        .bind(email)
        .bind(password)
        .fetch_optional(self.get_pool())
        .await?;

        user.ok_or(LedgerError::InvalidCredentials)
    }

    async fn sign_out(&self, user_id: Uuid) -> LedgerResult<()> {
        info!(%user_id, "session closed");
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    async fn projects(&self) -> LedgerResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, created_by, created_by_email, is_active, created_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }

    async fn invoices(&self) -> LedgerResult<Vec<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC");
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(invoices)
    }

    async fn payroll_entries(&self) -> LedgerResult<Vec<PayrollEntry>> {
        let entries = sqlx::query_as::<_, PayrollEntry>(
            r#"
            SELECT id, project_id, COALESCE(amount::float8, 0.0) AS amount, created_by, created_at
            FROM payroll_entries
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(entries)
    }

    async fn invoice_files(&self) -> LedgerResult<Vec<InvoiceFile>> {
        let files = sqlx::query_as::<_, InvoiceFile>(
            r#"
            SELECT id, invoice_id, file_name, file_path, file_url, created_by, created_at
            FROM invoice_files
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(files)
    }

    async fn insert_project(&self, project: &NewProject) -> LedgerResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO projects (name, created_by, created_by_email)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&project.name)
        .bind(project.created_by)
        .bind(&project.created_by_email)
        .fetch_one(self.get_pool())
        .await?;

        debug!(%id, "project inserted");
        Ok(id)
    }

    async fn set_project_active(&self, id: Uuid, active: bool) -> LedgerResult<()> {
        sqlx::query("UPDATE projects SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> LedgerResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn insert_invoice(&self, invoice: &NewInvoice) -> LedgerResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoices (
                project_id, amount, "date", expected_payment_date,
                created_by, created_by_email, paid, paid_at, seen_by_admin,
                image_name, image_path, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, false, NULL, false, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(invoice.project_id)
        .bind(invoice.amount)
        .bind(invoice.date)
        .bind(invoice.expected_payment_date)
        .bind(invoice.created_by)
        .bind(&invoice.created_by_email)
        .bind(&invoice.image_name)
        .bind(&invoice.image_path)
        .bind(&invoice.image_url)
        .fetch_one(self.get_pool())
        .await?;

        debug!(%id, "invoice inserted");
        Ok(id)
    }

    async fn update_invoice(&self, id: Uuid, changes: &InvoiceChanges) -> LedgerResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        // Only the columns present in the change set are touched.
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE invoices SET ");
        let mut columns = builder.separated(", ");
        if let Some(amount) = changes.amount {
            columns.push("amount = ").push_bind_unseparated(amount);
        }
        if let Some(date) = changes.date {
            columns.push("\"date\" = ").push_bind_unseparated(date);
        }
        if let Some(expected) = changes.expected_payment_date {
            columns
                .push("expected_payment_date = ")
                .push_bind_unseparated(expected);
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder.build().execute(self.get_pool()).await?;

        Ok(())
    }

    async fn set_invoice_paid(
        &self,
        id: Uuid,
        paid: bool,
        paid_at: Option<NaiveDate>,
    ) -> LedgerResult<()> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET paid = $1, paid_at = $2, seen_by_admin = true
            WHERE id = $3
            "#,
        )
        .bind(paid)
        .bind(paid_at)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    async fn mark_invoice_seen(&self, id: Uuid) -> LedgerResult<()> {
        sqlx::query("UPDATE invoices SET seen_by_admin = true WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn clear_invoice_image(&self, id: Uuid) -> LedgerResult<()> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET image_name = NULL, image_path = NULL, image_url = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    async fn delete_invoice(&self, id: Uuid) -> LedgerResult<()> {
        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn insert_invoice_file(&self, file: &NewInvoiceFile) -> LedgerResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoice_files (invoice_id, file_name, file_path, file_url, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(file.invoice_id)
        .bind(&file.file_name)
        .bind(&file.file_path)
        .bind(&file.file_url)
        .bind(file.created_by)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    async fn delete_invoice_file(&self, id: Uuid) -> LedgerResult<()> {
        sqlx::query("DELETE FROM invoice_files WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn insert_payroll_entry(&self, entry: &NewPayrollEntry) -> LedgerResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO payroll_entries (project_id, amount, created_by)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(entry.project_id)
        .bind(entry.amount)
        .bind(entry.created_by)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }
}

/// Initialize the database connection
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    info!("database connection established");

    Ok(db)
}
