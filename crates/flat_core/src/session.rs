//! Authentication status of the running client

use crate::backend::SessionBackend;
use crate::error::{AppError, Result};
use crate::models::CurrentUser;

/// Who is logged in, if anyone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<CurrentUser>,
}

impl Session {
    /// Anonymous session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Ask the backend who owns the session cookie. Any failure means anonymous.
    pub async fn bootstrap<B: SessionBackend + ?Sized>(backend: &B) -> Self {
        match backend.me().await {
            Ok(user) => {
                tracing::info!("Session restored for {}", user.email);
                Self { user: Some(user) }
            }
            Err(e) => {
                tracing::debug!("No active session: {}", e);
                Self::anonymous()
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Gate for flows that only make sense when logged in
    pub fn require_user(&self) -> Result<&CurrentUser> {
        self.user.as_ref().ok_or(AppError::NotAuthenticated)
    }

    pub fn login(&mut self, user: CurrentUser) {
        tracing::info!("Logged in as {}", user.email);
        self.user = Some(user);
    }

    /// Log out on the server, then forget the user regardless of the outcome
    pub async fn logout<B: SessionBackend + ?Sized>(&mut self, backend: &B) -> Result<()> {
        let result = backend.logout().await;
        if let Err(e) = &result {
            tracing::warn!("Logout request failed: {}", e);
        }
        self.user = None;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FakeSession {
        user: Option<CurrentUser>,
        logout_fails: bool,
    }

    #[async_trait]
    impl SessionBackend for FakeSession {
        async fn me(&self) -> Result<CurrentUser> {
            self.user.clone().ok_or(AppError::status(401, None))
        }

        async fn logout(&self) -> Result<()> {
            if self.logout_fails {
                Err(AppError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: Some(1),
            email: "eva@example.cz".into(),
            username: None,
            name: Some("Eva".into()),
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_authenticated() {
        let backend = FakeSession {
            user: Some(user()),
            logout_fails: false,
        };
        let session = Session::bootstrap(&backend).await;
        assert!(session.is_authenticated());
        assert_eq!(session.require_user().unwrap().email, "eva@example.cz");
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_anonymous() {
        let backend = FakeSession {
            user: None,
            logout_fails: false,
        };
        let session = Session::bootstrap(&backend).await;
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_user(), Err(AppError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_logout_clears_even_on_failure() {
        let backend = FakeSession {
            user: None,
            logout_fails: true,
        };
        let mut session = Session::anonymous();
        session.login(user());
        assert!(session.is_authenticated());

        assert!(session.logout(&backend).await.is_err());
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
    }
}
