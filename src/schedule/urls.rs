//! Site URL conventions

use chrono::NaiveDate;
use url::Url;

use crate::error::{ErrorCode, RelishError, Result};

pub const DEFAULT_BASE_URL: &str = "https://relish.ezcater.com";
pub const DEFAULT_LOGIN_URL: &str = "https://login.ezcater.com/relish/sessions/new";

/// Login page plus one schedule page per calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base_url: Url,
    login_url: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str, login_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_http_url(base_url)?,
            login_url: parse_http_url(login_url)?,
        })
    }

    pub fn login_url(&self) -> &str {
        self.login_url.as_str()
    }

    /// `<base>/schedule/YYYY-MM-DD`
    pub fn date_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/schedule/{}",
            self.base_url.as_str().trim_end_matches('/'),
            date.format("%Y-%m-%d")
        )
    }

    /// Inverse of [`SiteUrls::date_url`] for URLs following the convention
    pub fn date_from_url(url: &str) -> Option<NaiveDate> {
        let (_, tail) = url.trim_end_matches('/').rsplit_once("/schedule/")?;
        NaiveDate::parse_from_str(tail, "%Y-%m-%d").ok()
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_LOGIN_URL)
            .unwrap_or_else(|_| unreachable!("default site URLs are valid"))
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        RelishError::config_with_code(ErrorCode::CONFIG_INVALID_URL, format!("invalid URL '{raw}'"))
            .with_source(e)
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelishError::config_with_code(
            ErrorCode::CONFIG_INVALID_URL,
            format!("URL '{raw}' must use http or https"),
        ));
    }
    Ok(url)
}
