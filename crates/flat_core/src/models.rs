//! Wire models for the FlatFly backend

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AppError;

/// Kind of a listing card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    #[serde(rename = "APARTMENT")]
    Apartment,
    #[serde(rename = "ROOM")]
    Room,
    #[serde(rename = "NEIGHBOUR")]
    Neighbour,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Apartment => "APARTMENT",
            ListingKind::Room => "ROOM",
            ListingKind::Neighbour => "NEIGHBOUR",
        }
    }

    /// Collection page a detail view falls back to
    pub fn collection_path(&self) -> &'static str {
        match self {
            ListingKind::Apartment => "/apartments",
            ListingKind::Room => "/rooms",
            ListingKind::Neighbour => "/neighbours",
        }
    }

    /// Detail page path for a card of this kind
    pub fn detail_path(&self, id: u64) -> String {
        format!("{}/{}", self.collection_path(), id)
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APARTMENT" | "APARTMENTS" => Ok(ListingKind::Apartment),
            "ROOM" | "ROOMS" => Ok(ListingKind::Room),
            "NEIGHBOUR" | "NEIGHBOURS" => Ok(ListingKind::Neighbour),
            other => Err(AppError::Validation(format!("unknown listing type: {}", other))),
        }
    }
}

/// Price as sent by the backend: a decimal string or a bare number
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Price(pub String);

impl Price {
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Price(s),
            Repr::Number(n) => Price(n.to_string()),
        })
    }
}

/// Accepts a number, a numeric string, an empty string or null
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Number(n)) => Some(n),
        Some(Repr::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Accepts a list of strings, a comma-separated string or null
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::List(items)) => items,
        Some(Repr::Text(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}

/// Listing as returned by `/api/listings/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ListingKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub rooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub beds: Option<u32>,
    #[serde(default)]
    pub has_roommates: Option<bool>,
    #[serde(default)]
    pub rental_period: Option<String>,
    #[serde(default)]
    pub internet: Option<bool>,
    #[serde(default)]
    pub utilities: Option<bool>,
    #[serde(default)]
    pub pets_allowed: Option<bool>,
    #[serde(default)]
    pub smoking_allowed: Option<bool>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "is_favorite")]
    pub is_favorite: Option<bool>,
}

/// Roommate-seeking profile as returned by `/api/neighbours/...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbour {
    pub id: u64,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub alcohol: Option<String>,
    #[serde(default)]
    pub pets: Option<String>,
    #[serde(default)]
    pub sleep_schedule: Option<String>,
    #[serde(default)]
    pub gamer: Option<String>,
    #[serde(default)]
    pub work_from_home: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub looking_for_housing: bool,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Listing detail as returned by `/api/listings/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ListingKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub rooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub beds: Option<u32>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// One page of search results.
///
/// The backend wraps results as `{ results, total_pages }` (listings) or
/// `{ results, pages }` (neighbours); a bare array is accepted as a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            total_pages: 1,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Wrapped {
                results: Vec<T>,
                #[serde(default)]
                total_pages: Option<u32>,
                #[serde(default)]
                pages: Option<u32>,
            },
            Bare(Vec<T>),
        }

        Ok(match Repr::<T>::deserialize(deserializer)? {
            Repr::Wrapped {
                results,
                total_pages,
                pages,
            } => Page {
                results,
                total_pages: total_pages.or(pages).unwrap_or(1).max(1),
            },
            Repr::Bare(results) => Page {
                results,
                total_pages: 1,
            },
        })
    }
}

/// Saved listing as returned by `/api/favorites/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteListing {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub room_type: Option<ListingKind>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub area: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesPage {
    #[serde(default)]
    pub listings: Vec<FavoriteListing>,
    #[serde(default = "one")]
    pub total_pages: u32,
}

fn one() -> u32 {
    1
}

/// What a favorite toggle points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    Listing(u64),
    Profile(u64),
}

impl FavoriteTarget {
    /// Target for a card: neighbour cards bookmark the profile
    pub fn for_card(kind: ListingKind, id: u64) -> Self {
        match kind {
            ListingKind::Neighbour => FavoriteTarget::Profile(id),
            _ => FavoriteTarget::Listing(id),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            FavoriteTarget::Listing(id) | FavoriteTarget::Profile(id) => *id,
        }
    }

    /// Request body for the add/remove endpoints
    pub fn payload(&self) -> serde_json::Value {
        match self {
            FavoriteTarget::Listing(id) => serde_json::json!({ "listing_id": id }),
            FavoriteTarget::Profile(id) => serde_json::json!({ "profile_id": id }),
        }
    }
}

/// Response of the add/remove endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FavoriteResponse {
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Logged-in account as reported by `/api/me/` or the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| (!full.is_empty()).then_some(full))
            .or_else(|| self.username.clone().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| self.email.clone())
    }
}

/// Rental term offered by a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RentalPeriod {
    Short,
    Long,
    Both,
}

impl FromStr for RentalPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHORT" => Ok(RentalPeriod::Short),
            "LONG" => Ok(RentalPeriod::Long),
            "BOTH" => Ok(RentalPeriod::Both),
            other => Err(AppError::Validation(format!("unknown rental period: {}", other))),
        }
    }
}

/// Body of a new listing (`POST /api/listings/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewListing {
    #[serde(rename = "type")]
    pub kind: Option<ListingKind>,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub region: String,
    pub address: String,
    pub size: Option<u32>,
    pub rooms: Option<u32>,
    pub beds: Option<u32>,
    pub has_roommates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_period: Option<RentalPeriod>,
    pub amenities: Vec<String>,
    pub internet: bool,
    pub utilities: bool,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub move_in_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedListing {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedImage {
    #[serde(default)]
    pub id: Option<u64>,
    pub url: String,
}

/// User profile (`/api/profile/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub photo: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub languages: Vec<String>,
    pub profession: Option<String>,
    pub about: Option<String>,
    pub smoking: Option<String>,
    pub alcohol: Option<String>,
    pub sleep_schedule: Option<String>,
    pub noise_tolerance: Option<String>,
    pub gamer: Option<String>,
    pub work_from_home: Option<String>,
    pub pets: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub cleanliness: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub introvert_extrovert: Option<u32>,
    pub guests_parties: Option<String>,
    pub preferred_gender: Option<String>,
    pub preferred_age_range: Option<String>,
    pub verified: bool,
    pub looking_for_housing: bool,
}

/// Card view model shared by list, neighbour and favorites pages
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: u64,
    pub kind: ListingKind,
    pub title: String,
    pub price: Option<Price>,
    pub address: String,
    pub size: Option<u32>,
    pub image: String,
    pub amenities: Vec<String>,
    pub is_favorite: bool,
}

impl Card {
    pub fn favorite_target(&self) -> FavoriteTarget {
        FavoriteTarget::for_card(self.kind, self.id)
    }
}

impl From<&Listing> for Card {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id,
            kind: l.kind,
            title: l.title.clone().unwrap_or_default(),
            price: Some(l.price.clone()),
            address: l.address.clone().unwrap_or_default(),
            size: l.size,
            image: crate::image_or_default(l.image.as_deref()),
            amenities: l.amenities.clone(),
            is_favorite: l.is_favorite.unwrap_or(false),
        }
    }
}

impl From<&Neighbour> for Card {
    fn from(n: &Neighbour) -> Self {
        let title = match n.age {
            Some(age) => format!("{}, {}", n.name, age),
            None => n.name.clone(),
        };
        Self {
            id: n.id,
            kind: ListingKind::Neighbour,
            title,
            price: None,
            address: crate::region_value_to_label(n.city.as_deref()),
            size: None,
            image: crate::image_or_default(n.avatar.as_deref()),
            amenities: n.languages.clone(),
            is_favorite: n.is_favorite.unwrap_or(false),
        }
    }
}

impl From<&FavoriteListing> for Card {
    fn from(f: &FavoriteListing) -> Self {
        Self {
            id: f.id,
            // Favorites only hold listings; unknown kinds render as apartments
            kind: match f.room_type {
                Some(ListingKind::Room) => ListingKind::Room,
                _ => ListingKind::Apartment,
            },
            title: f.title.clone(),
            price: Some(f.price.clone()),
            address: f.city.clone().unwrap_or_default(),
            size: f.area,
            image: crate::image_or_default(f.image_url.as_deref()),
            amenities: f.amenities.clone(),
            is_favorite: f.is_favorite.unwrap_or(true),
        }
    }
}
