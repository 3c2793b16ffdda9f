//! HTTP client for the FlatFly backend

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use flat_core::forms::UploadFile;
use flat_core::{
    ApiConfig, AppError, Article, ArticleList, CreatedListing, CurrentUser, DetailData, FavoriteResponse, FavoriteTarget,
    FavoritesBackend, FavoritesPage, Listing, ListingDetail, ListingKind, Neighbour, NewListing,
    Page, Profile, Result, SessionBackend, UploadedImage,
};

use crate::response::{check_status, cookie_value, parse_response};

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// Request body variants
enum Body {
    Empty,
    Json(serde_json::Value),
    /// Already urlencoded
    Form(String),
    Multipart(Form),
}

#[derive(Deserialize)]
struct LoginResponse {
    user: CurrentUser,
}

#[derive(Deserialize)]
struct AvatarResponse {
    avatar: String,
}

/// Cookie-carrying client bound to one backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

impl ApiClient {
    /// `base_url` may carry a path prefix; endpoints resolve below it
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url).map_err(|e| {
            AppError::Config(format!("invalid api.base_url '{}': {}", config.base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "api.base_url '{}' is not an http(s) address",
                config.base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        tracing::debug!("API client for {}", base);
        Ok(Self { http, jar, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Current cookies as a `Cookie` header value
    pub fn export_cookies(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Restore cookies saved by [`ApiClient::export_cookies`]
    pub fn import_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| p.contains('=')) {
            self.jar.add_cookie_str(pair, &self.base);
        }
    }

    fn csrf_token(&self) -> Option<String> {
        let header = self.export_cookies()?;
        cookie_value(&header, CSRF_COOKIE)
    }

    fn url(&self, path: &str, query: Option<&str>) -> Result<Url> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| AppError::Config(format!("bad endpoint '{}': {}", path, e)))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, body: Body) -> RequestBuilder {
        let mutating = method != Method::GET;
        let mut request = self.http.request(method, url);

        if mutating {
            if let Some(token) = self.csrf_token() {
                request = request.header(CSRF_HEADER, token);
            }
        }

        match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Form(encoded) => request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded),
            Body::Multipart(form) => request.multipart(form),
        }
    }

    /// Send a request; returns the status and raw body
    async fn execute(&self, method: Method, path: &str, query: Option<&str>, body: Body) -> Result<(u16, Vec<u8>)> {
        let url = self.url(path, query)?;
        tracing::debug!("{} {}", method, url);

        let response = self
            .request(method.clone(), url.clone(), body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("{} {} failed: {}", method, url, e);
                AppError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::warn!("{} {} returned {}", method, url, status);
        }
        Ok((status, bytes.to_vec()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> Result<T> {
        let (status, body) = self.execute(Method::GET, path, query, Body::Empty).await?;
        parse_response(status, &body)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Body) -> Result<T> {
        let (status, body) = self.execute(Method::POST, path, None, body).await?;
        parse_response(status, &body)
    }

    /// POST where only the status matters
    async fn post_ok(&self, path: &str, body: Body) -> Result<()> {
        let (status, body) = self.execute(Method::POST, path, None, body).await?;
        check_status(status, &body)
    }

    async fn image_part(file: &UploadFile) -> Result<Part> {
        let bytes = tokio::fs::read(&file.path).await?;
        Part::bytes(bytes)
            .file_name(file.file_name())
            .mime_str(file.mime)
            .map_err(|e| AppError::Validation(format!("{}: {}", file.path.display(), e)))
    }

    // ========================================
    // Listings and neighbours
    // ========================================

    pub async fn listings(&self, query: &str) -> Result<Page<Listing>> {
        self.get("api/listings/list", Some(query)).await
    }

    pub async fn neighbours(&self, query: &str) -> Result<Page<Neighbour>> {
        self.get("api/neighbours/list", Some(query)).await
    }

    pub async fn listing_detail(&self, id: u64) -> Result<ListingDetail> {
        self.get(&format!("api/listings/{}/", id), None).await
    }

    pub async fn neighbour_detail(&self, id: u64) -> Result<Neighbour> {
        self.get(&format!("api/neighbours/{}/", id), None).await
    }

    /// Detail of any card kind
    pub async fn detail(&self, kind: ListingKind, id: u64) -> Result<DetailData> {
        match kind {
            ListingKind::Neighbour => self.neighbour_detail(id).await.map(DetailData::Neighbour),
            ListingKind::Apartment | ListingKind::Room => {
                self.listing_detail(id).await.map(DetailData::Listing)
            }
        }
    }

    // ========================================
    // Favorites
    // ========================================

    pub async fn favorites(&self, page: u32) -> Result<FavoritesPage> {
        let query = format!("page={}", page.max(1));
        self.get("api/favorites/", Some(&query)).await
    }

    /// Whether a listing is saved; profiles are not covered by this endpoint
    pub async fn is_favorite(&self, listing_id: u64) -> Result<bool> {
        let query = format!("listing_id={}", listing_id);
        let response: FavoriteResponse = self.get("api/favorites/is-favorite/", Some(&query)).await?;
        Ok(response.is_favorite.unwrap_or(false))
    }

    // ========================================
    // Publishing
    // ========================================

    pub async fn create_listing(&self, listing: &NewListing) -> Result<CreatedListing> {
        let body = serde_json::to_value(listing)?;
        self.post("api/listings/", Body::Json(body)).await
    }

    pub async fn upload_listing_image(&self, listing_id: u64, file: &UploadFile) -> Result<UploadedImage> {
        let form = Form::new().part("image", Self::image_part(file).await?);
        self.post(&format!("api/listings/{}/images/", listing_id), Body::Multipart(form))
            .await
    }

    // ========================================
    // Account
    // ========================================

    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response: LoginResponse = self.post("api/auth/login/", Body::Json(body)).await?;
        Ok(response.user)
    }

    /// Create an account; the backend logs the new user in
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<CurrentUser> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let response: LoginResponse = self.post("api/auth/register/", Body::Json(body)).await?;
        Ok(response.user)
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.get("api/profile/", None).await
    }

    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        let body = serde_json::to_value(profile)?;
        self.post_ok("api/profile/", Body::Json(body)).await
    }

    /// Upload a new avatar; returns its URL
    pub async fn upload_avatar(&self, file: &UploadFile) -> Result<String> {
        let form = Form::new().part("avatar", Self::image_part(file).await?);
        let response: AvatarResponse = self.post("api/profile/avatar/", Body::Multipart(form)).await?;
        Ok(response.avatar)
    }

    /// Ask for a reset link by email; the backend expects a form post here
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .finish();
        self.post_ok("api/auth/password-reset/", Body::Form(body)).await
    }

    pub async fn confirm_password_reset(&self, uid: &str, token: &str, password: &str) -> Result<()> {
        let body = serde_json::json!({ "password": password });
        self.post_ok(
            &format!("api/auth/password-reset-confirm/{}/{}/", uid, token),
            Body::Json(body),
        )
        .await
    }

    // ========================================
    // Articles and contact
    // ========================================

    pub async fn articles(&self) -> Result<Vec<Article>> {
        let list: ArticleList = self.get("api/articles/", None).await?;
        Ok(list.articles)
    }

    pub async fn article(&self, id: u64) -> Result<Article> {
        self.get(&format!("api/articles/{}/", id), None).await
    }

    pub async fn send_contact(&self, name: &str, email: &str, message: &str) -> Result<()> {
        let body = serde_json::json!({ "name": name, "email": email, "message": message });
        self.post_ok("api/contact/", Body::Json(body)).await
    }
}

#[async_trait]
impl FavoritesBackend for ApiClient {
    async fn add_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse> {
        self.post("api/favorites/add/", Body::Json(target.payload())).await
    }

    async fn remove_favorite(&self, target: FavoriteTarget) -> Result<FavoriteResponse> {
        self.post("api/favorites/remove/", Body::Json(target.payload())).await
    }
}

#[async_trait]
impl SessionBackend for ApiClient {
    async fn me(&self) -> Result<CurrentUser> {
        self.get("api/me/", None).await
    }

    async fn logout(&self) -> Result<()> {
        self.post_ok("api/logout/", Body::Empty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = ApiConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(ApiClient::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        let api = client();
        let url = api.url("api/listings/list", Some("page=2&search=Praha")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/listings/list?page=2&search=Praha");

        let url = api.url("api/me/", Some("")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/me/");
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        for base_url in ["https://example.cz/flatfly", "https://example.cz/flatfly/"] {
            let config = ApiConfig {
                base_url: base_url.into(),
                ..Default::default()
            };
            let api = ApiClient::new(&config).unwrap();
            let url = api.url("api/articles/3/", None).unwrap();
            assert_eq!(url.as_str(), "https://example.cz/flatfly/api/articles/3/");
        }

        let config = ApiConfig {
            base_url: "mailto:eva@example.cz".into(),
            ..Default::default()
        };
        assert!(matches!(ApiClient::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_form_body_and_csrf_header() {
        let api = client();
        api.import_cookies("csrftoken=tok");

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", "eva+test@example.cz")
            .finish();
        let url = api.url("api/auth/password-reset/", None).unwrap();
        let request = api.request(Method::POST, url, Body::Form(body)).build().unwrap();

        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.headers().get(CSRF_HEADER).unwrap(), "tok");
        let sent = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(sent, b"email=eva%2Btest%40example.cz");

        let url = api.url("api/articles/", None).unwrap();
        let request = api.request(Method::GET, url, Body::Empty).build().unwrap();
        assert!(request.headers().get(CSRF_HEADER).is_none());
    }

    #[test]
    fn test_cookie_import_feeds_csrf() {
        let api = client();
        assert_eq!(api.csrf_token(), None);

        api.import_cookies("sessionid=s3cr3t; csrftoken=tok");
        assert_eq!(api.csrf_token().as_deref(), Some("tok"));

        let exported = api.export_cookies().unwrap();
        assert!(exported.contains("sessionid=s3cr3t"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let api = ApiClient::new(&config).unwrap();
        let err = api.me().await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn test_upload_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png").unwrap();

        let file = flat_core::forms::check_upload(&path).unwrap();
        assert!(ApiClient::image_part(&file).await.is_ok());

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(ApiClient::image_part(&file).await, Err(AppError::Io(_))));
    }
}
