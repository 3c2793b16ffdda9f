//! FlatFly client core
//!
//! This crate contains:
//! - Filter criteria and their query-string form
//! - Gallery navigation with a transition lock
//! - Optimistic favorite toggles
//! - List pages with stale-response protection
//! - Session, configuration and application state
//! - Wire models, blog articles, form checks and error types

pub mod articles;
pub mod backend;
pub mod config;
pub mod detail;
pub mod error;
pub mod favorite;
pub mod filter;
pub mod forms;
pub mod gallery;
pub mod list_page;
pub mod models;
pub mod optimistic;
pub mod regions;
pub mod session;
pub mod state;

pub use articles::{Article, ArticleContent, ArticleList};
pub use backend::{FavoritesBackend, SessionBackend};
pub use config::{ApiConfig, AppConfig, GalleryConfig, ListingsConfig, LoggingConfig};
pub use detail::{DetailData, DetailOutcome, DetailView, ProfileEditor};
pub use error::{AppError, Result};
pub use favorite::{CardContext, FavoriteAction, FavoriteRequest, FavoriteToggle, ToggleEffect};
pub use filter::{
    FilterController, FilterCriteria, NeighbourField, NeighbourFilters, PropertyField,
    PropertyFilters,
};
pub use gallery::{Gallery, GalleryKey, GalleryPhase};
pub use list_page::{Applied, FetchTicket, ListPage, Unfiltered};
pub use models::{
    Card, CreatedListing, CurrentUser, FavoriteListing, FavoriteResponse, FavoriteTarget,
    FavoritesPage, Listing, ListingDetail, ListingKind, Neighbour, NewListing, Page, Price,
    Profile, RentalPeriod, UploadedImage,
};
pub use optimistic::{Optimistic, Outcome};
pub use regions::{image_or_default, region_value_to_label, CZECH_REGIONS, DEFAULT_IMAGE_URL};
pub use session::Session;
pub use state::AppState;
