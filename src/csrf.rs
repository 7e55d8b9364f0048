use percent_encoding::percent_decode_str;

use crate::error::ViewError;
use crate::page::Page;

/// Finds the anti-forgery token the server expects on mutating requests.
pub struct CredentialAttacher {
    page: Page,
    cookie_name: String,
}

impl CredentialAttacher {
    pub fn new(page: Page, cookie_name: &str) -> Self {
        Self {
            page,
            cookie_name: cookie_name.to_string(),
        }
    }

    /// Looks in the cookie, then the meta tag, then the hidden form input,
    /// then any element carrying the input's name. Empty when none is found.
    pub fn token(&self) -> String {
        if let Some(token) = cookie_value(&self.page.cookies(), &self.cookie_name) {
            return token;
        }
        let markup = self.page.csrf_markup();
        [markup.meta, markup.input, markup.named]
            .into_iter()
            .flatten()
            .find(|token| !token.is_empty())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> bool {
        if self.token().is_empty() {
            tracing::warn!("CSRF token not found. This may cause authentication issues.");
            return false;
        }
        true
    }

    /// The token, or `ViewError::Security` when none can be found.
    pub fn require(&self) -> Result<String, ViewError> {
        if !self.validate() {
            return Err(ViewError::Security);
        }
        Ok(self.token())
    }
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.trim() != name {
                return None;
            }
            Some(percent_decode_str(value.trim()).decode_utf8_lossy().into_owned())
        })
        .filter(|token| !token.is_empty())
}
