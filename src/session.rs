use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::AuthProvider;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Role, SessionUser};

/// Email/password session on top of an [`AuthProvider`].
///
/// The role is decided locally from the configured admin list. Every sign-in
/// and sign-out is published to subscribers.
pub struct Session {
    auth: Arc<dyn AuthProvider>,
    admin_emails: Vec<String>,
    current: watch::Sender<Option<SessionUser>>,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthProvider>, admin_emails: Vec<String>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            auth,
            admin_emails: admin_emails
                .into_iter()
                .map(|email| email.trim().to_lowercase())
                .collect(),
            current,
        }
    }

    pub fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.iter().any(|admin| admin == email) {
            Role::Admin
        } else {
            Role::Regular
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> LedgerResult<SessionUser> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.trim().is_empty() {
            return Err(LedgerError::MissingCredentials);
        }

        let auth_user = match self.auth.sign_in(&email, password).await {
            Ok(user) => user,
            Err(e) => {
                warn!(%email, error = %e, "sign-in rejected");
                return Err(e);
            }
        };

        let email = auth_user.email.to_lowercase();
        let user = SessionUser {
            id: auth_user.id,
            role: self.role_for(&email),
            email,
        };
        info!(email = %user.email, role = user.role.label(), "signed in");
        self.current.send_replace(Some(user.clone()));

        Ok(user)
    }

    pub async fn sign_out(&self) -> LedgerResult<()> {
        if let Some(user) = self.current_user() {
            self.auth.sign_out(user.id).await?;
            info!(email = %user.email, "signed out");
        }
        self.current.send_replace(None);

        Ok(())
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.current.borrow().clone()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.current.subscribe()
    }
}
