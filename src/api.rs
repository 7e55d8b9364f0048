use reqwest::{header, Client, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ErrorBody, ViewError};
use crate::models::{Booking, Category, Event, Guest, Listing, Service, Vendor};

/// Raw outcome of a request that reached the server.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ViewError> {
        serde_json::from_str(&self.body).map_err(|err| ViewError::Decode(err.to_string()))
    }

    pub fn error_body(&self) -> Option<ErrorBody> {
        ErrorBody::parse(&self.body)
    }

    /// Server `error` text, or `fallback` when the body carries none.
    pub fn error_message(&self, fallback: &str) -> String {
        self.error_body()
            .map(|body| body.message_or(fallback))
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Thin client over the Evently REST API. Sends the page's session cookies
/// with every request and the anti-forgery header with every mutation.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
    cookies: String,
    csrf_header: String,
}

impl ApiClient {
    pub fn new(base_url: &str, cookies: &str, csrf_header: &str) -> Result<Self, ViewError> {
        let base = Url::parse(base_url)
            .map_err(|err| ViewError::InvalidState(format!("invalid base url {base_url}: {err}")))?;
        let client = Client::builder()
            .user_agent("evently-view/0.1")
            .build()
            .map_err(|err| ViewError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base,
            cookies: cookies.to_string(),
            csrf_header: csrf_header.to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ViewError> {
        self.base
            .join(path)
            .map_err(|err| ViewError::InvalidState(format!("invalid path {path}: {err}")))
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        if self.cookies.trim().is_empty() {
            builder
        } else {
            builder.header(header::COOKIE, self.cookies.as_str())
        }
    }

    async fn get(&self, url: Url) -> Result<ApiResponse, ViewError> {
        tracing::debug!("GET {url}");
        let response = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|err| ViewError::Network(format!("request failed for {url}: {err}")))?;
        read(response).await
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        url: Url,
        failure: &str,
    ) -> Result<Vec<T>, ViewError> {
        let response = self.get(url).await?;
        if !response.is_success() {
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message: failure.to_string(),
            });
        }
        let listing: Listing<T> = response.json()?;
        Ok(listing.into_items())
    }

    /// Sends a JSON mutation. Only transport failures are errors; callers
    /// inspect the status themselves.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<ApiResponse, ViewError> {
        let url = self.url(path)?;
        tracing::debug!("{method} {url}");
        let response = self
            .request(method, url.clone())
            .header(self.csrf_header.as_str(), token)
            .json(body)
            .send()
            .await
            .map_err(|err| ViewError::Network(format!("request failed for {url}: {err}")))?;
        read(response).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ViewError> {
        self.get_listing(self.url("/vendors/categories/")?, "Failed to fetch categories")
            .await
    }

    pub async fn my_events(&self) -> Result<Vec<Event>, ViewError> {
        let mut url = self.url("/events/")?;
        url.query_pairs_mut().append_pair("mine", "1");
        self.get_listing(url, "Failed to fetch events").await
    }

    pub async fn event_guests(&self, event_id: u64) -> Result<Vec<Guest>, ViewError> {
        self.get_listing(
            self.url(&format!("/events/{event_id}/guests/"))?,
            "Failed to fetch guests",
        )
        .await
    }

    pub async fn event_bookings(&self, event_id: u64) -> Result<Vec<Booking>, ViewError> {
        self.get_listing(
            self.url(&format!("/events/{event_id}/vendors/"))?,
            "Failed to fetch vendors",
        )
        .await
    }

    pub async fn vendors(&self, category: Option<&str>) -> Result<Vec<Vendor>, ViewError> {
        let mut url = self.url("/vendors/")?;
        if let Some(category) = category.filter(|c| !c.is_empty() && *c != "all") {
            url.query_pairs_mut().append_pair("category", category);
        }
        self.get_listing(url, "Failed to fetch vendors").await
    }

    pub async fn vendor_services(&self, vendor_id: u64) -> Result<Vec<Service>, ViewError> {
        self.get_listing(
            self.url(&format!("/vendors/{vendor_id}/services/"))?,
            "Failed to fetch services",
        )
        .await
    }

    /// Raw response so the dashboard can run the auth interceptor first.
    pub async fn vendor_dashboard_bookings(&self) -> Result<ApiResponse, ViewError> {
        self.get(self.url("/vendors/dashboard/bookings/")?).await
    }
}

async fn read(response: reqwest::Response) -> Result<ApiResponse, ViewError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ViewError::Network(format!("unable to read response body: {err}")))?;
    Ok(ApiResponse { status, body })
}
