//! Client-side checks for the publish, upload, account and contact forms

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::NewListing;
use crate::regions::is_region;

/// Largest image accepted for upload
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const MIN_PASSWORD_LEN: usize = 6;

/// One rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Collapse field errors into a single `Validation` error
pub fn ensure_valid(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::Validation(joined))
}

/// Required fields of a new listing
pub fn validate_listing(draft: &NewListing) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.kind.is_none() {
        errors.push(FieldError::new("type", "choose an ad type"));
    }
    if draft.title.trim().is_empty() {
        errors.push(FieldError::new("title", "title is required"));
    }
    if draft.description.trim().is_empty() {
        errors.push(FieldError::new("description", "description is required"));
    }
    match draft.price {
        Some(p) if p > 0.0 => {}
        _ => errors.push(FieldError::new("price", "price must be a positive number")),
    }
    if !draft.region.is_empty() && !is_region(&draft.region) {
        errors.push(FieldError::new("region", "unknown region code"));
    }

    errors
}

/// Loose shape check: something before and after a single `@`, a dot in the domain
pub fn is_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !is_email(email) {
        errors.push(FieldError::new("email", "enter a valid email address"));
    }
}

fn check_password(errors: &mut Vec<FieldError>, password: &str) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "password must be at least 6 characters"));
    }
}

pub fn validate_register(name: &str, email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    }
    check_email(&mut errors, email);
    check_password(&mut errors, password);
    errors
}

pub fn validate_contact(name: &str, email: &str, message: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    }
    check_email(&mut errors, email);
    if message.trim().is_empty() {
        errors.push(FieldError::new("message", "message is required"));
    }
    errors
}

/// The reset-link request only needs an address
pub fn validate_reset_request(email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_email(&mut errors, email);
    errors
}

pub fn validate_password_reset(password: &str, confirm: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_password(&mut errors, password);

    if confirm.is_empty() {
        errors.push(FieldError::new("confirmPassword", "please confirm the password"));
    } else if confirm != password {
        errors.push(FieldError::new("confirmPassword", "passwords do not match"));
    }

    errors
}

/// Image file that passed the upload checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub mime: &'static str,
    pub size: u64,
}

impl UploadFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// MIME type for an accepted image extension
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Check type and size of one file against the upload limits
pub fn check_upload_meta(path: &Path, size: u64) -> Result<UploadFile> {
    let mime = image_mime(path).ok_or_else(|| {
        AppError::Validation(format!("{}: only JPEG and PNG images are accepted", path.display()))
    })?;

    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "{}: file is larger than 10 MB",
            path.display()
        )));
    }

    Ok(UploadFile {
        path: path.to_path_buf(),
        mime,
        size,
    })
}

/// Check a file on disk
pub fn check_upload(path: &Path) -> Result<UploadFile> {
    let size = std::fs::metadata(path)?.len();
    check_upload_meta(path, size)
}

/// Split a selection into accepted files and per-file rejections
pub fn partition_uploads<I, P>(paths: I) -> (Vec<UploadFile>, Vec<AppError>)
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for path in paths {
        match check_upload(path.as_ref()) {
            Ok(file) => accepted.push(file),
            Err(e) => {
                tracing::warn!("Upload rejected: {}", e);
                rejected.push(e);
            }
        }
    }

    (accepted, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingKind;
    use std::io::Write;

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_empty_listing_draft() {
        let errors = validate_listing(&NewListing::default());
        assert_eq!(fields(&errors), vec!["type", "title", "description", "price"]);
        assert!(matches!(ensure_valid(errors), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_complete_listing_draft() {
        let draft = NewListing {
            kind: Some(ListingKind::Apartment),
            title: "2+kk Vinohrady".into(),
            description: "Quiet street".into(),
            price: Some(18000.0),
            ..Default::default()
        };
        assert!(validate_listing(&draft).is_empty());

        let free = NewListing {
            price: Some(0.0),
            ..draft
        };
        assert_eq!(fields(&validate_listing(&free)), vec!["price"]);
    }

    #[test]
    fn test_password_reset_rules() {
        assert_eq!(fields(&validate_password_reset("", "")), vec!["password", "confirmPassword"]);
        assert_eq!(fields(&validate_password_reset("abc", "abc")), vec!["password"]);
        assert_eq!(fields(&validate_password_reset("abcdef", "abcdeg")), vec!["confirmPassword"]);
        assert!(validate_password_reset("abcdef", "abcdef").is_empty());
        assert!(ensure_valid(Vec::new()).is_ok());
    }

    #[test]
    fn test_listing_region_must_be_known() {
        let draft = NewListing {
            kind: Some(ListingKind::Room),
            title: "Room".into(),
            description: "Near the tram".into(),
            price: Some(8000.0),
            region: "ATLANTIS".into(),
            ..Default::default()
        };
        assert_eq!(fields(&validate_listing(&draft)), vec!["region"]);

        let prague = NewListing {
            region: "PRAGUE".into(),
            ..draft
        };
        assert!(validate_listing(&prague).is_empty());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email("eva@example.cz"));
        assert!(is_email(" eva@mail.example.cz "));
        assert!(!is_email("eva"));
        assert!(!is_email("@example.cz"));
        assert!(!is_email("eva@localhost"));
        assert!(!is_email("eva@a@b.cz"));
        assert!(!is_email("eva@example."));
    }

    #[test]
    fn test_register_and_contact_rules() {
        assert_eq!(fields(&validate_register("", "", "")), vec!["name", "email", "password"]);
        assert_eq!(fields(&validate_register("Eva", "eva", "secret1")), vec!["email"]);
        assert_eq!(fields(&validate_register("Eva", "eva@example.cz", "abc")), vec!["password"]);
        assert!(validate_register("Eva", "eva@example.cz", "secret1").is_empty());

        assert_eq!(fields(&validate_contact(" ", "eva@example.cz", "")), vec!["name", "message"]);
        assert!(validate_contact("Eva", "eva@example.cz", "Hi").is_empty());

        assert_eq!(fields(&validate_reset_request("")), vec!["email"]);
        assert!(validate_reset_request("eva@example.cz").is_empty());
    }

    #[test]
    fn test_upload_type_and_size() {
        assert_eq!(image_mime(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("a.png")), Some("image/png"));
        assert_eq!(image_mime(Path::new("a.gif")), None);
        assert_eq!(image_mime(Path::new("noext")), None);

        assert!(check_upload_meta(Path::new("a.jpeg"), MAX_UPLOAD_BYTES).is_ok());
        assert!(check_upload_meta(Path::new("a.jpeg"), MAX_UPLOAD_BYTES + 1).is_err());
        assert!(check_upload_meta(Path::new("a.webp"), 10).is_err());
    }

    #[test]
    fn test_partition_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("room.png");
        std::fs::File::create(&good).unwrap().write_all(b"png").unwrap();
        let bad = dir.path().join("notes.txt");
        std::fs::File::create(&bad).unwrap();
        let missing = dir.path().join("gone.jpg");

        let (accepted, rejected) = partition_uploads([&good, &bad, &missing]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].size, 3);
        assert_eq!(accepted[0].file_name(), "room.png");
        assert_eq!(rejected.len(), 2);
    }
}
