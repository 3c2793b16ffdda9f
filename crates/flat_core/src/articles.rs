//! Blog articles served by `/api/articles/`

use serde::{Deserialize, Serialize};

/// Article body per language, as HTML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleContent {
    pub en: String,
    pub ru: String,
    pub cz: String,
}

impl ArticleContent {
    /// Body in `lang`, falling back to English when that translation is empty
    pub fn get(&self, lang: &str) -> &str {
        let localized = match lang.to_ascii_lowercase().as_str() {
            "ru" => self.ru.as_str(),
            "cz" | "cs" => self.cz.as_str(),
            _ => "",
        };
        if localized.trim().is_empty() {
            &self.en
        } else {
            localized
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Free-form display date
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub content: ArticleContent,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArticleList {
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Reduce article HTML to readable text.
///
/// Block-level closing tags and `<br>` become line breaks, every other tag is
/// dropped, and the common entities are decoded.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = &rest[start..];
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        let name = tag.trim_start_matches('/').split([' ', '/']).next().unwrap_or("");
        if matches!(name, "br" | "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4")
            && (tag.starts_with('/') || name == "br")
        {
            out.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
