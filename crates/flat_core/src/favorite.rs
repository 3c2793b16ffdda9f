//! Per-card favorite toggle with optimistic update and revert-on-error

use crate::backend::FavoritesBackend;
use crate::error::Result;
use crate::models::{FavoriteResponse, FavoriteTarget};
use crate::optimistic::{Optimistic, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

/// Where the card is rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CardContext {
    #[default]
    Browse,
    /// "My favorites": a confirmed removal drops the card from the list
    FavoritesList,
}

/// Request the caller must send for a started toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FavoriteRequest {
    pub target: FavoriteTarget,
    pub action: FavoriteAction,
}

/// What the parent list should do after a toggle settles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleEffect {
    None,
    /// Dropped from a favorites list
    Removed(FavoriteTarget),
}

#[derive(Clone, Debug)]
pub struct FavoriteToggle {
    target: FavoriteTarget,
    context: CardContext,
    state: Optimistic<bool>,
    in_flight: Option<FavoriteAction>,
}

impl FavoriteToggle {
    pub fn new(target: FavoriteTarget, is_favorite: bool) -> Self {
        Self {
            target,
            context: CardContext::Browse,
            state: Optimistic::Confirmed(is_favorite),
            in_flight: None,
        }
    }

    pub fn with_context(mut self, context: CardContext) -> Self {
        self.context = context;
        self
    }

    pub fn target(&self) -> FavoriteTarget {
        self.target
    }

    pub fn is_favorite(&self) -> bool {
        *self.state.value()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn state(&self) -> &Optimistic<bool> {
        &self.state
    }

    /// Parent re-rendered with a fresh server flag
    pub fn sync_from_server(&mut self, is_favorite: bool) {
        if !self.is_busy() {
            self.state = Optimistic::Confirmed(is_favorite);
        }
    }

    /// Flip locally and return the request to send.
    ///
    /// Returns `None` while another toggle for this card is in flight.
    pub fn begin(&mut self) -> Option<FavoriteRequest> {
        if self.is_busy() {
            tracing::debug!(target = ?self.target, "Favorite toggle already in flight");
            return None;
        }

        let previous = self.is_favorite();
        let guess = !previous;
        let action = if guess {
            FavoriteAction::Add
        } else {
            FavoriteAction::Remove
        };

        self.state = Optimistic::pending(previous, guess);
        self.in_flight = Some(action);
        Some(FavoriteRequest {
            target: self.target,
            action,
        })
    }

    /// Settle the in-flight toggle with the backend's answer
    pub fn complete(&mut self, response: Result<FavoriteResponse>) -> ToggleEffect {
        let Some(action) = self.in_flight.take() else {
            return ToggleEffect::None;
        };

        let accepted = response.is_ok();
        let outcome = match response {
            Ok(body) => Outcome::Accepted(body.is_favorite),
            Err(e) => {
                tracing::warn!(target = ?self.target, "Favorite toggle failed, reverting: {}", e);
                Outcome::Rejected
            }
        };

        let state = std::mem::replace(&mut self.state, Optimistic::Confirmed(false));
        self.state = state.resolve(outcome);

        if accepted && action == FavoriteAction::Remove && self.context == CardContext::FavoritesList {
            ToggleEffect::Removed(self.target)
        } else {
            ToggleEffect::None
        }
    }

    /// Full click: flip, send, settle
    pub async fn toggle<B: FavoritesBackend + ?Sized>(&mut self, backend: &B) -> ToggleEffect {
        let Some(request) = self.begin() else {
            return ToggleEffect::None;
        };

        let response = match request.action {
            FavoriteAction::Add => backend.add_favorite(request.target).await,
            FavoriteAction::Remove => backend.remove_favorite(request.target).await,
        };
        self.complete(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records calls and answers with a canned result
    struct FakeBackend {
        calls: Mutex<Vec<(FavoriteAction, FavoriteTarget)>>,
        reply: fn() -> Result<FavoriteResponse>,
    }

    impl FakeBackend {
        fn new(reply: fn() -> Result<FavoriteResponse>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    #[async_trait]
    impl FavoritesBackend for FakeBackend {
        async fn add_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse> {
            self.calls.lock().push((FavoriteAction::Add, target));
            (self.reply)()
        }

        async fn remove_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse> {
            self.calls.lock().push((FavoriteAction::Remove, target));
            (self.reply)()
        }
    }

    #[tokio::test]
    async fn test_unfavorite_reverts_on_http_error() {
        let backend = FakeBackend::new(|| Err(AppError::status(500, None)));
        let mut card = FavoriteToggle::new(FavoriteTarget::Listing(4), true);

        let effect = card.toggle(&backend).await;

        assert_eq!(
            backend.calls.lock().as_slice(),
            &[(FavoriteAction::Remove, FavoriteTarget::Listing(4))]
        );
        assert!(card.is_favorite());
        assert!(!card.is_busy());
        assert_eq!(card.state(), &Optimistic::RolledBack(true));
        assert_eq!(effect, ToggleEffect::None);
    }

    #[tokio::test]
    async fn test_server_flag_is_authoritative() {
        // Server says it is still a favorite even though we asked to add
        let backend = FakeBackend::new(|| Ok(FavoriteResponse { is_favorite: Some(false) }));
        let mut card = FavoriteToggle::new(FavoriteTarget::Profile(2), false);

        card.toggle(&backend).await;
        assert!(!card.is_favorite());
        assert_eq!(backend.calls.lock()[0].0, FavoriteAction::Add);
    }

    #[tokio::test]
    async fn test_missing_flag_keeps_guess() {
        let backend = FakeBackend::new(|| Ok(FavoriteResponse::default()));
        let mut card = FavoriteToggle::new(FavoriteTarget::Listing(1), false);

        card.toggle(&backend).await;
        assert!(card.is_favorite());
        assert_eq!(card.state(), &Optimistic::Confirmed(true));
    }

    #[tokio::test]
    async fn test_remove_in_favorites_list_notifies_parent() {
        let backend = FakeBackend::new(|| Ok(FavoriteResponse { is_favorite: Some(false) }));
        let mut card = FavoriteToggle::new(FavoriteTarget::Listing(8), true)
            .with_context(CardContext::FavoritesList);

        let effect = card.toggle(&backend).await;
        assert_eq!(effect, ToggleEffect::Removed(FavoriteTarget::Listing(8)));
    }

    #[test]
    fn test_reentrant_click_is_ignored() {
        let mut card = FavoriteToggle::new(FavoriteTarget::Listing(3), false);

        let first = card.begin().unwrap();
        assert_eq!(first.action, FavoriteAction::Add);
        assert!(card.is_favorite());

        // Second click while the first request is outstanding
        assert_eq!(card.begin(), None);
        assert!(card.is_favorite());

        card.sync_from_server(false);
        assert!(card.is_favorite(), "sync ignored while busy");

        let effect = card.complete(Err(AppError::Transport("reset".into())));
        assert_eq!(effect, ToggleEffect::None);
        assert!(!card.is_favorite());
        assert!(card.begin().is_some());
    }

    #[test]
    fn test_complete_without_begin_is_noop() {
        let mut card = FavoriteToggle::new(FavoriteTarget::Listing(3), true);
        assert_eq!(card.complete(Ok(FavoriteResponse::default())), ToggleEffect::None);
        assert!(card.is_favorite());
    }
}
