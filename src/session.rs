// src/session.rs
//! Client-side session lifecycle. The store owns the identity for the
//! duration of a run; the provider behind it is injected, so demo/offline
//! operation is an explicit provider choice and never an auth bypass.

use rocket::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AuthError;
use crate::types::{Identity, UserRole};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// External identity collaborator: managed auth in production, an explicit
/// demo directory when running offline.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        credentials: &Credentials,
        role: UserRole,
        display_name: &str,
    ) -> Result<Identity, AuthError>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
    async fn sign_out(&self);
}

struct DemoAccount {
    email: String,
    identity: Identity,
    verified: bool,
}

/// Directory of demo identities, all sharing one well-known password.
/// Constructed explicitly from configuration; nothing here touches the
/// authenticated request path of the API.
pub struct DemoDirectory {
    accounts: Mutex<Vec<DemoAccount>>,
    password: String,
}

impl DemoDirectory {
    pub fn new(identities: Vec<(String, Identity)>, password: impl Into<String>) -> Self {
        let accounts = identities
            .into_iter()
            .map(|(email, identity)| DemoAccount {
                email,
                identity,
                verified: true,
            })
            .collect();

        Self {
            accounts: Mutex::new(accounts),
            password: password.into(),
        }
    }

    /// Mark a signed-up account as verified, standing in for the email
    /// confirmation step of a managed provider.
    pub async fn verify(&self, email: &str) -> bool {
        let mut accounts = self.accounts.lock().await;
        match accounts.iter_mut().find(|account| account.email == email) {
            Some(account) => {
                account.verified = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityProvider for DemoDirectory {
    /// New sign-ups start unverified; `sign_in` rejects them until
    /// `verify` runs.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        role: UserRole,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        if credentials.password != self.password {
            return Err(AuthError::InvalidCredentials);
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|account| account.email == credentials.email) {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity::new(credentials.email.clone(), role, display_name);
        accounts.push(DemoAccount {
            email: credentials.email.clone(),
            identity: identity.clone(),
            verified: false,
        });
        Ok(identity)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        if credentials.password != self.password {
            return Err(AuthError::InvalidCredentials);
        }

        let accounts = self.accounts.lock().await;
        let account = accounts
            .iter()
            .find(|account| account.email == credentials.email)
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.verified {
            return Err(AuthError::AccountUnverified);
        }
        Ok(account.identity.clone())
    }

    async fn sign_out(&self) {}
}

pub struct SessionStore<P: IdentityProvider> {
    provider: P,
    current: Option<Identity>,
}

impl<P: IdentityProvider> SessionStore<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    /// Authenticate against the provider. Re-authenticating as the identity
    /// already held is an idempotent success; a different identity replaces
    /// the session (last write wins, single active session per client).
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in(credentials).await?;

        if let Some(current) = &self.current {
            if *current == identity {
                return Ok(identity);
            }
            info!("Replacing session {} with {}", current.user_id, identity.user_id);
        }

        self.current = Some(identity.clone());
        info!("Session established for {}", identity.user_id);
        Ok(identity)
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Clear the session. Safe to call when already logged out.
    pub async fn logout(&mut self) {
        if let Some(identity) = self.current.take() {
            self.provider.sign_out().await;
            info!("Session cleared for {}", identity.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> DemoDirectory {
        DemoDirectory::new(
            vec![
                (
                    "alice@example.com".to_string(),
                    Identity::new("alice", UserRole::Seeker, "Alice"),
                ),
                (
                    "bob@example.com".to_string(),
                    Identity::new("bob", UserRole::Recruiter, "Bob"),
                ),
            ],
            "demo",
        )
    }

    #[tokio::test]
    async fn authenticate_then_logout() {
        let mut store = SessionStore::new(directory());
        assert!(store.current_identity().is_none());

        let identity = store
            .authenticate(&Credentials::new("alice@example.com", "demo"))
            .await
            .unwrap();
        assert_eq!(identity.user_id, "alice");
        assert_eq!(store.current_identity().unwrap().user_id, "alice");

        store.logout().await;
        assert!(store.current_identity().is_none());

        // Logout when already logged out is a no-op.
        store.logout().await;
        assert!(store.current_identity().is_none());
    }

    #[tokio::test]
    async fn bad_credentials_leave_session_untouched() {
        let mut store = SessionStore::new(directory());
        store
            .authenticate(&Credentials::new("alice@example.com", "demo"))
            .await
            .unwrap();

        let err = store
            .authenticate(&Credentials::new("alice@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(store.current_identity().unwrap().user_id, "alice");
    }

    #[tokio::test]
    async fn sign_up_requires_verification_before_sign_in() {
        let provider = directory();
        let credentials = Credentials::new("carol@example.com", "demo");

        let identity = provider
            .sign_up(&credentials, UserRole::Seeker, "Carol")
            .await
            .unwrap();
        assert_eq!(identity.role, UserRole::Seeker);

        // Unverified accounts are rejected with a distinct error.
        let err = provider.sign_in(&credentials).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountUnverified));

        assert!(provider.verify("carol@example.com").await);
        assert!(provider.sign_in(&credentials).await.is_ok());

        // Re-registering a known email fails.
        assert!(provider
            .sign_up(&credentials, UserRole::Seeker, "Carol")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn reauthentication_is_idempotent_and_last_write_wins() {
        let mut store = SessionStore::new(directory());
        store
            .authenticate(&Credentials::new("alice@example.com", "demo"))
            .await
            .unwrap();
        store
            .authenticate(&Credentials::new("alice@example.com", "demo"))
            .await
            .unwrap();
        assert_eq!(store.current_identity().unwrap().user_id, "alice");

        store
            .authenticate(&Credentials::new("bob@example.com", "demo"))
            .await
            .unwrap();
        assert_eq!(store.current_identity().unwrap().user_id, "bob");
    }
}
