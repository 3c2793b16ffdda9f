//! Session cookies persisted between runs

use anyhow::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use flat_api::ApiClient;

pub fn cookie_path() -> PathBuf {
    ProjectDirs::from("cz", "FlatFly", "flatfly")
        .map(|dirs| dirs.data_dir().join("cookies"))
        .unwrap_or_else(|| PathBuf::from("./cookies"))
}

/// Feed saved cookies into the client; a missing file is not an error
pub fn load_into(path: &Path, api: &ApiClient) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let header = std::fs::read_to_string(path)?;
    let header = header.trim();
    if header.is_empty() {
        return Ok(false);
    }
    api.import_cookies(header);
    tracing::debug!("Session cookies loaded from {:?}", path);
    Ok(true)
}

pub fn save_from(path: &Path, api: &ApiClient) -> Result<()> {
    let Some(header) = api.export_cookies() else {
        return clear(path);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, header)?;
    tracing::debug!("Session cookies saved to {:?}", path);
    Ok(())
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flat_core::ApiConfig;

    #[test]
    fn test_cookie_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("cookies");

        let first = ApiClient::new(&ApiConfig::default()).unwrap();
        assert!(!load_into(&path, &first).unwrap());
        first.import_cookies("sessionid=abc; csrftoken=t0k");
        save_from(&path, &first).unwrap();

        let second = ApiClient::new(&ApiConfig::default()).unwrap();
        assert!(load_into(&path, &second).unwrap());
        let cookies = second.export_cookies().unwrap();
        assert!(cookies.contains("sessionid=abc"));
        assert!(cookies.contains("csrftoken=t0k"));

        clear(&path).unwrap();
        assert!(!path.exists());
        clear(&path).unwrap();
    }
}
