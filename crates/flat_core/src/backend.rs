//! Backend ports used by the stateful components
//!
//! `flat_api::ApiClient` implements these over HTTP; tests use in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CurrentUser, FavoriteResponse, FavoriteTarget};

#[async_trait]
pub trait FavoritesBackend: Send + Sync {
    async fn add_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse>;

    async fn remove_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse>;
}

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Who owns the current session cookie
    async fn me(&self) -> Result<CurrentUser>;

    async fn logout(&self) -> Result<()>;
}
