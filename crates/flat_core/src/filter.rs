//! Filter criteria for listing and neighbour searches
//!
//! A criteria object is a flat set of named fields. Scalar fields hold one token
//! (empty = unset), multi-select fields hold an ordered token list. Editors never
//! mutate the owner's criteria; they build replacement objects with the pure
//! helpers below and hand them to [`FilterController::replace`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

use crate::AppError;

/// Read view of one field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue<'a> {
    Single(&'a str),
    Multi(&'a [String]),
}

impl FilterValue<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Single(v) => v.is_empty(),
            FilterValue::Multi(v) => v.is_empty(),
        }
    }
}

/// Write access to one field, used only on freshly cloned objects
pub enum FilterSlot<'a> {
    Single(&'a mut String),
    Multi(&'a mut Vec<String>),
}

/// A set of search constraints for one listing collection
pub trait FilterCriteria: Clone + Default + PartialEq + fmt::Debug {
    type Field: Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = AppError> + 'static;

    /// Every recognized field, in serialization order
    const FIELDS: &'static [Self::Field];

    fn value(&self, field: Self::Field) -> FilterValue<'_>;

    fn slot_mut(&mut self, field: Self::Field) -> FilterSlot<'_>;

    /// Copy with one field replaced.
    ///
    /// On a multi-select field a non-empty value becomes the only token.
    fn with_field(&self, field: Self::Field, value: &str) -> Self {
        let mut next = self.clone();
        match next.slot_mut(field) {
            FilterSlot::Single(slot) => *slot = value.to_string(),
            FilterSlot::Multi(slot) => {
                slot.clear();
                if !value.is_empty() {
                    slot.push(value.to_string());
                }
            }
        }
        next
    }

    /// True when no field constrains the search
    fn is_unconstrained(&self) -> bool {
        Self::FIELDS.iter().all(|f| self.value(*f).is_empty())
    }
}

/// Add `token` to a token list if absent, remove it if present
pub fn toggle_token(tokens: &[String], token: &str) -> Vec<String> {
    if tokens.iter().any(|t| t == token) {
        tokens.iter().filter(|t| *t != token).cloned().collect()
    } else {
        let mut next = tokens.to_vec();
        next.push(token.to_string());
        next
    }
}

/// Toggle a token in a multi-select field, returning a new criteria object.
///
/// Scalar fields are returned unchanged.
pub fn toggle_multi_value<C: FilterCriteria>(criteria: &C, field: C::Field, token: &str) -> C {
    let mut next = criteria.clone();
    if let FilterSlot::Multi(slot) = next.slot_mut(field) {
        *slot = toggle_token(slot, token);
    }
    next
}

/// The all-empty default
pub fn reset<C: FilterCriteria>() -> C {
    C::default()
}

/// Serialize criteria into a query string.
///
/// `page` always comes first, then `search` when non-empty, then every
/// non-empty field in declaration order. Multi-select tokens repeat as
/// `field[]=token`.
pub fn serialize<C: FilterCriteria>(criteria: &C, page: u32, search: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    if !search.is_empty() {
        query.append_pair("search", search);
    }
    append_criteria(&mut query, criteria);
    query.finish()
}

/// Append the non-empty fields of `criteria` to a query under construction
pub fn append_criteria<C: FilterCriteria>(query: &mut form_urlencoded::Serializer<'_, String>, criteria: &C) {
    for field in C::FIELDS {
        match criteria.value(*field) {
            FilterValue::Single(v) if !v.is_empty() => {
                query.append_pair(&field.to_string(), v);
            }
            FilterValue::Multi(tokens) => {
                let key = format!("{}[]", field);
                for token in tokens {
                    query.append_pair(&key, token);
                }
            }
            _ => {}
        }
    }
}

/// Parse a `field=value` pair into a replacement object.
///
/// Multi-select fields accept a comma-separated token list.
pub fn apply_pair<C: FilterCriteria>(criteria: &C, pair: &str) -> Result<C, AppError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| AppError::Validation(format!("expected field=value, got '{}'", pair)))?;
    let field: C::Field = key.trim().parse()?;

    match criteria.value(field) {
        FilterValue::Multi(_) => {
            let mut tokens: Vec<&str> = Vec::new();
            for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
            let next = tokens
                .into_iter()
                .fold(criteria.with_field(field, ""), |next, token| {
                    toggle_multi_value(&next, field, token)
                });
            Ok(next)
        }
        FilterValue::Single(_) => Ok(criteria.with_field(field, value.trim())),
    }
}

/// Owner of the active criteria for one list page.
///
/// Every replacement bumps the revision; the page treats a revision change as
/// "refetch needed".
#[derive(Debug, Clone, Default)]
pub struct FilterController<C: FilterCriteria> {
    criteria: C,
    revision: u64,
}

impl<C: FilterCriteria> FilterController<C> {
    pub fn new() -> Self {
        Self {
            criteria: C::default(),
            revision: 0,
        }
    }

    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whole-object replace
    pub fn replace(&mut self, criteria: C) {
        tracing::debug!(?criteria, "Filters replaced");
        self.criteria = criteria;
        self.revision += 1;
    }

    /// Replace with the all-empty default
    pub fn reset(&mut self) {
        self.replace(reset());
    }

    pub fn serialize(&self, page: u32, search: &str) -> String {
        serialize(&self.criteria, page, search)
    }
}

// ========================================
// Property filters
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    PropertyType,
    Region,
    PriceFrom,
    PriceTo,
    Rooms,
    HasRoommates,
    RentalPeriod,
    Internet,
    Utilities,
    PetsAllowed,
    SmokingAllowed,
    MoveInDate,
    Amenities,
}

impl PropertyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyField::PropertyType => "propertyType",
            PropertyField::Region => "region",
            PropertyField::PriceFrom => "priceFrom",
            PropertyField::PriceTo => "priceTo",
            PropertyField::Rooms => "rooms",
            PropertyField::HasRoommates => "hasRoommates",
            PropertyField::RentalPeriod => "rentalPeriod",
            PropertyField::Internet => "internet",
            PropertyField::Utilities => "utilities",
            PropertyField::PetsAllowed => "petsAllowed",
            PropertyField::SmokingAllowed => "smokingAllowed",
            PropertyField::MoveInDate => "moveInDate",
            PropertyField::Amenities => "amenities",
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyFilters::FIELDS
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("unknown listing filter: {}", s)))
    }
}

/// Constraints for apartment and room searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyFilters {
    pub property_type: String,
    pub region: String,
    pub price_from: String,
    pub price_to: String,
    pub rooms: String,
    pub has_roommates: String,
    pub rental_period: String,
    pub internet: String,
    pub utilities: String,
    pub pets_allowed: String,
    pub smoking_allowed: String,
    pub move_in_date: String,
    pub amenities: Vec<String>,
}

impl FilterCriteria for PropertyFilters {
    type Field = PropertyField;

    const FIELDS: &'static [PropertyField] = &[
        PropertyField::PropertyType,
        PropertyField::Region,
        PropertyField::PriceFrom,
        PropertyField::PriceTo,
        PropertyField::Rooms,
        PropertyField::HasRoommates,
        PropertyField::RentalPeriod,
        PropertyField::Internet,
        PropertyField::Utilities,
        PropertyField::PetsAllowed,
        PropertyField::SmokingAllowed,
        PropertyField::MoveInDate,
        PropertyField::Amenities,
    ];

    fn value(&self, field: PropertyField) -> FilterValue<'_> {
        use FilterValue::Single;
        match field {
            PropertyField::PropertyType => Single(&self.property_type),
            PropertyField::Region => Single(&self.region),
            PropertyField::PriceFrom => Single(&self.price_from),
            PropertyField::PriceTo => Single(&self.price_to),
            PropertyField::Rooms => Single(&self.rooms),
            PropertyField::HasRoommates => Single(&self.has_roommates),
            PropertyField::RentalPeriod => Single(&self.rental_period),
            PropertyField::Internet => Single(&self.internet),
            PropertyField::Utilities => Single(&self.utilities),
            PropertyField::PetsAllowed => Single(&self.pets_allowed),
            PropertyField::SmokingAllowed => Single(&self.smoking_allowed),
            PropertyField::MoveInDate => Single(&self.move_in_date),
            PropertyField::Amenities => FilterValue::Multi(&self.amenities),
        }
    }

    fn slot_mut(&mut self, field: PropertyField) -> FilterSlot<'_> {
        use FilterSlot::Single;
        match field {
            PropertyField::PropertyType => Single(&mut self.property_type),
            PropertyField::Region => Single(&mut self.region),
            PropertyField::PriceFrom => Single(&mut self.price_from),
            PropertyField::PriceTo => Single(&mut self.price_to),
            PropertyField::Rooms => Single(&mut self.rooms),
            PropertyField::HasRoommates => Single(&mut self.has_roommates),
            PropertyField::RentalPeriod => Single(&mut self.rental_period),
            PropertyField::Internet => Single(&mut self.internet),
            PropertyField::Utilities => Single(&mut self.utilities),
            PropertyField::PetsAllowed => Single(&mut self.pets_allowed),
            PropertyField::SmokingAllowed => Single(&mut self.smoking_allowed),
            PropertyField::MoveInDate => Single(&mut self.move_in_date),
            PropertyField::Amenities => FilterSlot::Multi(&mut self.amenities),
        }
    }
}

// ========================================
// Neighbour filters
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighbourField {
    City,
    AgeFrom,
    AgeTo,
    Gender,
    Smoking,
    Alcohol,
    SleepSchedule,
    Profession,
    WorkFromHome,
    Languages,
    Interests,
}

impl NeighbourField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeighbourField::City => "city",
            NeighbourField::AgeFrom => "ageFrom",
            NeighbourField::AgeTo => "ageTo",
            NeighbourField::Gender => "gender",
            NeighbourField::Smoking => "smoking",
            NeighbourField::Alcohol => "alcohol",
            NeighbourField::SleepSchedule => "sleepSchedule",
            NeighbourField::Profession => "profession",
            NeighbourField::WorkFromHome => "workFromHome",
            NeighbourField::Languages => "languages",
            NeighbourField::Interests => "interests",
        }
    }
}

impl fmt::Display for NeighbourField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeighbourField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeighbourFilters::FIELDS
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("unknown neighbour filter: {}", s)))
    }
}

/// Constraints for roommate searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighbourFilters {
    pub city: String,
    pub age_from: String,
    pub age_to: String,
    pub gender: String,
    pub smoking: String,
    pub alcohol: String,
    pub sleep_schedule: String,
    pub profession: String,
    pub work_from_home: String,
    pub languages: Vec<String>,
    pub interests: String,
}

impl FilterCriteria for NeighbourFilters {
    type Field = NeighbourField;

    const FIELDS: &'static [NeighbourField] = &[
        NeighbourField::City,
        NeighbourField::AgeFrom,
        NeighbourField::AgeTo,
        NeighbourField::Gender,
        NeighbourField::Smoking,
        NeighbourField::Alcohol,
        NeighbourField::SleepSchedule,
        NeighbourField::Profession,
        NeighbourField::WorkFromHome,
        NeighbourField::Languages,
        NeighbourField::Interests,
    ];

    fn value(&self, field: NeighbourField) -> FilterValue<'_> {
        use FilterValue::Single;
        match field {
            NeighbourField::City => Single(&self.city),
            NeighbourField::AgeFrom => Single(&self.age_from),
            NeighbourField::AgeTo => Single(&self.age_to),
            NeighbourField::Gender => Single(&self.gender),
            NeighbourField::Smoking => Single(&self.smoking),
            NeighbourField::Alcohol => Single(&self.alcohol),
            NeighbourField::SleepSchedule => Single(&self.sleep_schedule),
            NeighbourField::Profession => Single(&self.profession),
            NeighbourField::WorkFromHome => Single(&self.work_from_home),
            NeighbourField::Languages => FilterValue::Multi(&self.languages),
            NeighbourField::Interests => Single(&self.interests),
        }
    }

    fn slot_mut(&mut self, field: NeighbourField) -> FilterSlot<'_> {
        use FilterSlot::Single;
        match field {
            NeighbourField::City => Single(&mut self.city),
            NeighbourField::AgeFrom => Single(&mut self.age_from),
            NeighbourField::AgeTo => Single(&mut self.age_to),
            NeighbourField::Gender => Single(&mut self.gender),
            NeighbourField::Smoking => Single(&mut self.smoking),
            NeighbourField::Alcohol => Single(&mut self.alcohol),
            NeighbourField::SleepSchedule => Single(&mut self.sleep_schedule),
            NeighbourField::Profession => Single(&mut self.profession),
            NeighbourField::WorkFromHome => Single(&mut self.work_from_home),
            NeighbourField::Languages => FilterSlot::Multi(&mut self.languages),
            NeighbourField::Interests => Single(&mut self.interests),
        }
    }
}

// ========================================
// Editor option lists (value, label)
// ========================================

pub const PROPERTY_TYPES: &[(&str, &str)] = &[
    ("ROOM", "Room"),
    ("APARTMENT", "Apartment"),
    ("HOUSE", "House"),
];

pub const ROOM_OPTIONS: &[&str] = &["1", "2", "3", "4", "5+"];

pub const YES_NO: &[(&str, &str)] = &[("yes", "Yes"), ("no", "No")];

pub const UTILITIES_OPTIONS: &[(&str, &str)] = &[("yes", "Included"), ("not", "Not included")];

pub const RENTAL_PERIODS: &[(&str, &str)] = &[("SHORT", "Short term"), ("LONG", "Long term")];

pub const AMENITIES: &[(&str, &str)] = &[
    ("washing_machine", "Washing machine"),
    ("dishwasher", "Dishwasher"),
    ("microwave", "Microwave"),
    ("oven", "Oven"),
    ("refrigerator", "Refrigerator"),
    ("tv", "TV"),
    ("air_conditioning", "Air conditioning"),
    ("heating", "Heating"),
    ("balcony", "Balcony"),
    ("parking", "Parking"),
];

pub const GENDERS: &[(&str, &str)] = &[("male", "Male"), ("female", "Female"), ("other", "Other")];

pub const SLEEP_SCHEDULES: &[(&str, &str)] = &[("early", "Early bird"), ("late", "Night owl")];

pub const LANGUAGES: &[(&str, &str)] = &[
    ("cz", "Čeština"),
    ("en", "English"),
    ("ru", "Русский"),
    ("de", "Deutsch"),
    ("sk", "Slovenčina"),
];

fn label_in(options: &[(&str, &'static str)], value: &str) -> Option<&'static str> {
    options.iter().find(|(v, _)| *v == value).map(|(_, l)| *l)
}

fn option_label(field: &str, value: &str) -> String {
    let table: &[(&str, &'static str)] = match field {
        "propertyType" => PROPERTY_TYPES,
        "region" => &crate::regions::CZECH_REGIONS,
        "hasRoommates" | "internet" | "petsAllowed" | "smokingAllowed" | "smoking" | "alcohol"
        | "workFromHome" => YES_NO,
        "utilities" => UTILITIES_OPTIONS,
        "rentalPeriod" => RENTAL_PERIODS,
        "amenities" => AMENITIES,
        "gender" => GENDERS,
        "sleepSchedule" => SLEEP_SCHEDULES,
        "languages" => LANGUAGES,
        _ => &[],
    };
    label_in(table, value)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Chips for the collapsed filter panel: one `(field, display)` per active field
pub fn active_summary<C: FilterCriteria>(criteria: &C) -> Vec<(C::Field, String)> {
    C::FIELDS
        .iter()
        .filter_map(|field| {
            let name = field.to_string();
            let display = match criteria.value(*field) {
                FilterValue::Single(v) if !v.is_empty() => option_label(&name, v),
                FilterValue::Multi(tokens) if !tokens.is_empty() => tokens
                    .iter()
                    .map(|t| option_label(&name, t))
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => return None,
            };
            Some((*field, display))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let base = PropertyFilters {
            amenities: vec!["tv".into(), "oven".into()],
            ..Default::default()
        };

        for token in ["tv", "balcony", "oven"] {
            let once = toggle_multi_value(&base, PropertyField::Amenities, token);
            let twice = toggle_multi_value(&once, PropertyField::Amenities, token);

            let mut original = base.amenities.clone();
            let mut round = twice.amenities.clone();
            original.sort();
            round.sort();
            assert_eq!(original, round, "token {}", token);
        }
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let base = NeighbourFilters::default();
        let a = toggle_multi_value(&base, NeighbourField::Languages, "cz");
        let b = toggle_multi_value(&a, NeighbourField::Languages, "en");
        let c = toggle_multi_value(&b, NeighbourField::Languages, "de");
        let d = toggle_multi_value(&c, NeighbourField::Languages, "en");
        assert_eq!(d.languages, vec!["cz", "de"]);
        // Original objects are never mutated
        assert!(base.languages.is_empty());
        assert_eq!(b.languages, vec!["cz", "en"]);
    }

    #[test]
    fn test_toggle_on_scalar_is_noop() {
        let base = PropertyFilters::default().with_field(PropertyField::Region, "PRAGUE");
        let next = toggle_multi_value(&base, PropertyField::Region, "USTECKY");
        assert_eq!(next, base);
    }

    #[test]
    fn test_empty_criteria_serialize_to_page_only() {
        assert_eq!(serialize(&PropertyFilters::default(), 1, ""), "page=1");
        assert_eq!(serialize(&NeighbourFilters::default(), 3, ""), "page=3");
        assert_eq!(
            serialize(&NeighbourFilters::default(), 1, "Brno"),
            "page=1&search=Brno"
        );
        assert!(reset::<PropertyFilters>().is_unconstrained());
    }

    #[test]
    fn test_serialize_scenario() {
        let filters = PropertyFilters::default()
            .with_field(PropertyField::PropertyType, "APARTMENT")
            .with_field(PropertyField::PriceFrom, "10000");

        let query = serialize(&filters, 2, "Praha");
        let mut got = pairs(&query);
        got.sort();

        let mut expected = vec![
            ("page".to_string(), "2".to_string()),
            ("search".to_string(), "Praha".to_string()),
            ("propertyType".to_string(), "APARTMENT".to_string()),
            ("priceFrom".to_string(), "10000".to_string()),
        ];
        expected.sort();
        assert_eq!(got, expected);
        assert_eq!(query, "page=2&search=Praha&propertyType=APARTMENT&priceFrom=10000");
    }

    #[test]
    fn test_serialize_multi_values() {
        let filters = NeighbourFilters {
            gender: "female".into(),
            languages: vec!["cz".into(), "en".into()],
            ..Default::default()
        };
        let got = pairs(&serialize(&filters, 1, "Ústí nad Labem"));
        assert_eq!(
            got,
            vec![
                ("page".to_string(), "1".to_string()),
                ("search".to_string(), "Ústí nad Labem".to_string()),
                ("gender".to_string(), "female".to_string()),
                ("languages[]".to_string(), "cz".to_string()),
                ("languages[]".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_controller_replace_bumps_revision() {
        let mut controller = FilterController::<PropertyFilters>::new();
        assert_eq!(controller.revision(), 0);

        let proposed = controller.criteria().with_field(PropertyField::Rooms, "2");
        assert!(controller.criteria().rooms.is_empty());

        controller.replace(proposed);
        assert_eq!(controller.criteria().rooms, "2");
        assert_eq!(controller.revision(), 1);

        controller.reset();
        assert!(controller.criteria().is_unconstrained());
        assert_eq!(controller.revision(), 2);
        assert_eq!(controller.serialize(1, ""), "page=1");
    }

    #[test]
    fn test_apply_pair() {
        let base = PropertyFilters::default();
        let next = apply_pair(&base, "region=PRAGUE").unwrap();
        assert_eq!(next.region, "PRAGUE");

        let next = apply_pair(&next, "amenities=tv, balcony").unwrap();
        assert_eq!(next.amenities, vec!["tv", "balcony"]);

        assert!(apply_pair(&base, "colour=red").is_err());
        assert!(apply_pair(&base, "region").is_err());
    }

    #[test]
    fn test_apply_pair_repeated_tokens() {
        let base = PropertyFilters::default();
        let next = apply_pair(&base, "amenities=tv,tv").unwrap();
        assert_eq!(next.amenities, vec!["tv"]);

        let next = apply_pair(&base, "amenities=tv,wifi,tv,,wifi").unwrap();
        assert_eq!(next.amenities, vec!["tv", "wifi"]);
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in PropertyFilters::FIELDS {
            assert_eq!(field.as_str().parse::<PropertyField>().unwrap(), *field);
        }
        for field in NeighbourFilters::FIELDS {
            assert_eq!(field.as_str().parse::<NeighbourField>().unwrap(), *field);
        }
    }

    #[test]
    fn test_active_summary() {
        let filters = PropertyFilters {
            region: "PRAGUE".into(),
            price_to: "20000".into(),
            amenities: vec!["tv".into(), "balcony".into()],
            ..Default::default()
        };
        let summary = active_summary(&filters);
        assert_eq!(
            summary,
            vec![
                (PropertyField::Region, "Praha".to_string()),
                (PropertyField::PriceTo, "20000".to_string()),
                (PropertyField::Amenities, "TV, Balcony".to_string()),
            ]
        );
    }
}
