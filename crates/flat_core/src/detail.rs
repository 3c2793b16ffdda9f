//! Detail views and the profile editor

use crate::error::Result;
use crate::filter::toggle_token;
use crate::gallery::Gallery;
use crate::models::{ListingDetail, ListingKind, Neighbour, Price, Profile};
use crate::optimistic::{Optimistic, Outcome};

/// Raw detail payload, by collection
#[derive(Debug, Clone, PartialEq)]
pub enum DetailData {
    Listing(ListingDetail),
    Neighbour(Neighbour),
}

/// Flattened detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: u64,
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub price: Option<Price>,
    pub address: String,
    pub size: Option<u32>,
    pub rooms: Option<u32>,
    pub beds: Option<u32>,
    pub languages: Vec<String>,
    pub badges: Vec<String>,
    pub images: Vec<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_favorite: bool,
}

/// Result of loading a detail page
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Loaded(DetailView),
    /// Load failed; go back to the collection
    Redirect(&'static str),
}

impl DetailOutcome {
    pub fn from_load(kind: ListingKind, result: Result<DetailData>) -> Self {
        match result {
            Ok(data) => DetailOutcome::Loaded(DetailView::from(data)),
            Err(e) => {
                tracing::warn!("Detail loading failed for {}: {}", kind, e);
                DetailOutcome::Redirect(kind.collection_path())
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Badges shown on a neighbour profile, derived from its flags
pub fn neighbour_badges(n: &Neighbour) -> Vec<String> {
    let mut badges = Vec::new();
    if n.verified {
        badges.push("Verified".to_string());
    }
    if n.looking_for_housing {
        badges.push("Looking for housing".to_string());
    }

    let labelled = [
        ("Gender", n.gender.as_deref()),
        ("Smoking", n.smoking.as_deref()),
        ("Alcohol", n.alcohol.as_deref()),
        ("Pets", n.pets.as_deref()),
        ("Sleep", n.sleep_schedule.as_deref()),
        ("Gamer", n.gamer.as_deref()),
        ("Work from home", n.work_from_home.as_deref()),
    ];
    for (label, value) in labelled {
        if let Some(v) = non_empty(value) {
            badges.push(format!("{}: {}", label, v));
        }
    }
    badges
}

impl From<ListingDetail> for DetailView {
    fn from(d: ListingDetail) -> Self {
        Self {
            id: d.id,
            kind: d.kind,
            title: d.title.unwrap_or_default(),
            description: d.description.unwrap_or_default(),
            price: Some(d.price),
            address: d.address.unwrap_or_default(),
            size: d.size,
            rooms: d.rooms,
            beds: d.beds,
            languages: Vec::new(),
            badges: d.badges,
            images: d.images.into_iter().filter(|i| !i.is_empty()).collect(),
            contact_phone: d.contact_phone,
            contact_email: d.contact_email,
            is_favorite: d.is_favorite.unwrap_or(false),
        }
    }
}

impl From<Neighbour> for DetailView {
    fn from(n: Neighbour) -> Self {
        let badges = neighbour_badges(&n);
        let title = n.name.clone();
        Self {
            id: n.id,
            kind: ListingKind::Neighbour,
            title,
            description: n.about.unwrap_or_default(),
            price: None,
            address: crate::region_value_to_label(n.city.as_deref()),
            size: None,
            rooms: None,
            beds: None,
            languages: n.languages,
            badges,
            images: non_empty(n.avatar.as_deref()).map(str::to_string).into_iter().collect(),
            contact_phone: None,
            contact_email: None,
            is_favorite: n.is_favorite.unwrap_or(false),
        }
    }
}

impl From<DetailData> for DetailView {
    fn from(data: DetailData) -> Self {
        match data {
            DetailData::Listing(d) => d.into(),
            DetailData::Neighbour(n) => n.into(),
        }
    }
}

impl DetailView {
    /// Gallery over this page's images
    pub fn gallery(&self) -> Gallery {
        Gallery::new(self.images.clone())
    }
}

/// Profile form with a saved baseline and an editable draft
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    saved: Optimistic<Profile>,
    draft: Profile,
}

impl ProfileEditor {
    pub fn new(profile: Profile) -> Self {
        Self {
            draft: profile.clone(),
            saved: Optimistic::Confirmed(profile),
        }
    }

    pub fn draft(&self) -> &Profile {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Profile {
        &mut self.draft
    }

    /// Last state the server is known (or assumed) to hold
    pub fn saved(&self) -> &Profile {
        self.saved.value()
    }

    pub fn is_saving(&self) -> bool {
        self.saved.is_pending()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != *self.saved.value()
    }

    pub fn toggle_language(&mut self, code: &str) {
        self.draft.languages = toggle_token(&self.draft.languages, code);
    }

    /// Local preview after an avatar upload
    pub fn set_photo(&mut self, url: impl Into<String>) {
        self.draft.photo = url.into();
    }

    /// Start a save; returns the body to send, or `None` while one is in flight
    pub fn begin_save(&mut self) -> Option<Profile> {
        if self.is_saving() {
            return None;
        }
        let previous = self.saved.value().clone();
        self.saved = Optimistic::pending(previous, self.draft.clone());
        Some(self.draft.clone())
    }

    /// Settle a save. On failure the draft keeps the user's edits.
    pub fn complete_save(&mut self, result: Result<Option<Profile>>) -> Result<()> {
        let (outcome, error) = match result {
            Ok(server) => (Outcome::Accepted(server), None),
            Err(e) => {
                tracing::warn!("Profile save failed: {}", e);
                (Outcome::Rejected, Some(e))
            }
        };

        let state = std::mem::replace(&mut self.saved, Optimistic::Confirmed(Profile::default()));
        self.saved = state.resolve(outcome);

        match error {
            Some(e) => Err(e),
            None => {
                self.draft = self.saved.value().clone();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;

    fn neighbour() -> Neighbour {
        serde_json::from_str(
            r#"{"id": 4, "name": "Eva", "age": 24, "city": "PRAGUE", "avatar": "/media/eva.jpg",
                "verified": true, "smoking": "no", "gamer": "", "languages": ["cz", "en"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_neighbour_badges() {
        assert_eq!(neighbour_badges(&neighbour()), vec!["Verified", "Smoking: no"]);
    }

    #[test]
    fn test_neighbour_view() {
        let view = DetailView::from(neighbour());
        assert_eq!(view.kind, ListingKind::Neighbour);
        assert_eq!(view.address, "Praha");
        assert_eq!(view.images, vec!["/media/eva.jpg"]);
        assert_eq!(view.gallery().len(), 1);
    }

    #[test]
    fn test_listing_view_drops_empty_images() {
        let detail: ListingDetail = serde_json::from_str(
            r#"{"id": 1, "type": "APARTMENT", "title": "Loft", "price": "21000",
                "images": ["/media/1.jpg", "", "/media/2.jpg"], "badges": ["New"],
                "contact_email": "owner@example.cz"}"#,
        )
        .unwrap();
        let view = DetailView::from(DetailData::Listing(detail));
        assert_eq!(view.images.len(), 2);
        assert_eq!(view.badges, vec!["New"]);
        assert_eq!(view.contact_email.as_deref(), Some("owner@example.cz"));
    }

    #[test]
    fn test_failed_load_redirects_to_collection() {
        let outcome = DetailOutcome::from_load(ListingKind::Room, Err(AppError::status(404, None)));
        assert_eq!(outcome, DetailOutcome::Redirect("/rooms"));

        let outcome = DetailOutcome::from_load(
            ListingKind::Neighbour,
            Err(AppError::Transport("refused".into())),
        );
        assert_eq!(outcome, DetailOutcome::Redirect("/neighbours"));
    }

    #[test]
    fn test_profile_save_failure_keeps_edits() {
        let mut editor = ProfileEditor::new(Profile {
            name: "Eva".into(),
            ..Default::default()
        });
        editor.toggle_language("cz");
        editor.draft_mut().about = Some("Quiet".into());
        assert!(editor.is_dirty());

        let body = editor.begin_save().unwrap();
        assert_eq!(body.languages, vec!["cz"]);
        assert!(editor.begin_save().is_none());

        assert!(editor.complete_save(Err(AppError::status(500, None))).is_err());
        assert!(!editor.is_saving());
        assert_eq!(editor.saved().about, None);
        assert_eq!(editor.draft().about.as_deref(), Some("Quiet"));
    }

    #[test]
    fn test_profile_save_success() {
        let mut editor = ProfileEditor::new(Profile::default());
        editor.toggle_language("en");
        editor.toggle_language("de");
        editor.toggle_language("en");
        editor.begin_save();

        editor.complete_save(Ok(None)).unwrap();
        assert_eq!(editor.saved().languages, vec!["de"]);
        assert!(!editor.is_dirty());
    }
}
