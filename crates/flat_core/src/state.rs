//! Application state management

use parking_lot::RwLock;

use crate::backend::SessionBackend;
use crate::config::AppConfig;
use crate::session::Session;

/// State shared by every command of one client run
pub struct AppState {
    /// Client configuration
    pub config: RwLock<AppConfig>,

    /// Authentication context
    pub session: RwLock<Session>,
}

impl AppState {
    /// State with an anonymous session
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
            session: RwLock::new(Session::anonymous()),
        }
    }

    /// Build the state and restore the session from the backend
    pub async fn bootstrap<B: SessionBackend + ?Sized>(config: AppConfig, backend: &B) -> Self {
        let session = Session::bootstrap(backend).await;
        Self {
            config: RwLock::new(config),
            session: RwLock::new(session),
        }
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.read().save()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }
}
