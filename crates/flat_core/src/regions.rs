//! Czech region codes and display labels

/// Region code → label, in the order the filter editor offers them
pub const CZECH_REGIONS: [(&str, &str); 14] = [
    ("PRAGUE", "Praha"),
    ("STREDOCESKY", "Středočeský kraj"),
    ("JIHOCESKY", "Jihočeský kraj"),
    ("PLZENSKY", "Plzeňský kraj"),
    ("KARLOVARSKY", "Karlovarský kraj"),
    ("USTECKY", "Ústecký kraj"),
    ("LIBERECKY", "Liberecký kraj"),
    ("KRALOVEHRADECKY", "Královéhradecký kraj"),
    ("PARDUBICKY", "Pardubický kraj"),
    ("VYSOCINA", "Vysočina"),
    ("JIHOMORAVSKY", "Jihomoravský kraj"),
    ("OLOMOUCKY", "Olomoucký kraj"),
    ("ZLINSKY", "Zlínský kraj"),
    ("MORAVSKOSLEZSKY", "Moravskoslezský kraj"),
];

/// Placeholder shown when a listing or profile has no image
pub const DEFAULT_IMAGE_URL: &str = "/assets/logo.png";

/// Label for a region code.
///
/// Unknown codes come back unchanged; an absent or empty code yields `""`.
pub fn region_value_to_label(value: Option<&str>) -> String {
    match value {
        None | Some("") => String::new(),
        Some(code) => CZECH_REGIONS
            .iter()
            .find(|(v, _)| *v == code)
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| code.to_string()),
    }
}

/// Is `code` one of the known region codes?
pub fn is_region(code: &str) -> bool {
    CZECH_REGIONS.iter().any(|(v, _)| *v == code)
}

/// The image itself, or the placeholder when none was provided
pub fn image_or_default(url: Option<&str>) -> String {
    match url {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => DEFAULT_IMAGE_URL.to_string(),
    }
}
