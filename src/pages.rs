//! Per-page entry points, dispatched on `main[data-page]`.

use std::sync::atomic::Ordering;

use crate::client::ViewClient;
use crate::error::ViewError;
use crate::models::{Booking, Listing};
use crate::page::PageKind;
use crate::render;

const VENDORS_SECTION: &str = "vendors-section";
const VENDORS_LOADING: &str = "vendors-loading";
const VENDORS_ERROR: &str = "vendors-error";
const VENDORS_UNAVAILABLE: &str =
    "Sorry, we couldn't load the vendors section at this time. Please try refreshing the page.";

fn alert(message: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">{}</div>"#,
        crate::utils::escape_html(message)
    )
}

impl ViewClient {
    /// Loads whatever the current page shows. Failures are rendered into the
    /// page rather than returned.
    pub async fn init_page(&self) -> Option<PageKind> {
        let kind = self.page.kind();
        tracing::info!("initializing page {kind:?} at {}", self.page.location());
        match kind {
            Some(PageKind::Index) => {
                if self.page.has("events-section") {
                    tokio::join!(self.load_categories(), self.load_events());
                } else {
                    self.load_categories().await;
                }
            }
            Some(PageKind::Vendors) => self.load_vendors_page().await,
            Some(PageKind::Events) => self.load_events().await,
            Some(PageKind::Profile) | None => {}
            Some(PageKind::VendorDashboard) => {
                if let Err(err) = self.load_vendor_bookings().await {
                    tracing::error!("vendor dashboard: {err}");
                }
            }
        }
        kind
    }

    pub async fn load_categories(&self) {
        match self.api.categories().await {
            Ok(categories) => {
                render::render_categories(&self.page, "categories-section", &categories);
            }
            Err(err) => {
                tracing::error!("categories: {err}");
                self.page
                    .set_html("categories-section", alert(&err.user_message()));
            }
        }
    }

    pub async fn load_events(&self) {
        match self.api.my_events().await {
            Ok(events) => {
                render::render_events(&self.page, "events-section", &events);
            }
            Err(err) => {
                tracing::error!("events: {err}");
                self.page
                    .set_html("events-section", alert(&err.user_message()));
            }
        }
    }

    async fn load_vendors_page(&self) {
        if !self.page.has(VENDORS_SECTION) {
            if self.page.has(VENDORS_ERROR) {
                self.page.show_error(VENDORS_ERROR, VENDORS_UNAVAILABLE);
            } else {
                tracing::error!("Vendors section could not be loaded.");
            }
            self.page.hide(VENDORS_LOADING);
            return;
        }

        let category = self.page.query_param("category");
        self.page.show(VENDORS_LOADING);
        self.page.hide(VENDORS_ERROR);
        match self.api.vendors(category.as_deref()).await {
            Ok(vendors) => {
                render::render_vendors(
                    &self.page,
                    VENDORS_SECTION,
                    &vendors,
                    &self.config.default_vendor_image,
                );
                self.page.set_active_category(category.as_deref());
            }
            Err(err) => {
                tracing::error!("vendors: {err}");
                self.page.show_error(VENDORS_ERROR, &err.user_message());
            }
        }
        self.page.hide(VENDORS_LOADING);
    }

    /// Applies a category filter on the vendors page without leaving it.
    /// Ignored while a previous filter is still loading.
    pub async fn filter_vendors_by_category(&self, category: &str) -> Result<(), ViewError> {
        if !self.page.has(VENDORS_SECTION) {
            return Ok(());
        }
        if self
            .filtering
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("vendor filter already loading; ignoring {category}");
            return Ok(());
        }
        let result = self.apply_category_filter(category).await;
        self.filtering.store(false, Ordering::Release);
        result
    }

    async fn apply_category_filter(&self, category: &str) -> Result<(), ViewError> {
        self.page.set_active_category(Some(category));
        self.page.show(VENDORS_LOADING);
        self.page.hide(VENDORS_ERROR);

        let filtered = !category.is_empty() && category != "all";
        let location = if filtered {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("category", category)
                .finish();
            format!("/vendors/?{query}")
        } else {
            "/vendors/".to_string()
        };
        self.page.navigate(&location);

        let result = self.api.vendors(Some(category)).await;
        self.page.hide(VENDORS_LOADING);
        match result {
            Ok(vendors) => {
                render::render_vendors(
                    &self.page,
                    VENDORS_SECTION,
                    &vendors,
                    &self.config.default_vendor_image,
                );
                Ok(())
            }
            Err(err) => {
                self.page.show_error(
                    VENDORS_ERROR,
                    &format!("Failed to filter vendors: {}", err.user_message()),
                );
                Err(err)
            }
        }
    }

    /// Leaves for the vendor listing of a category card.
    pub fn open_category(&self, category_id: &str) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("category", category_id)
            .finish();
        let location = format!("/vendors/page/?{query}");
        self.page.navigate(&location);
        location
    }

    /// Fetches the signed-in vendor's bookings into `#bookings-list`.
    pub async fn load_vendor_bookings(&self) -> Result<(), ViewError> {
        self.page.show("bookings-loading");
        self.page.hide("bookings-error");

        let result = self.fetch_vendor_bookings().await;
        self.page.hide("bookings-loading");
        match result {
            Ok(Some(bookings)) => {
                render::render_vendor_bookings(&self.page, "bookings-list", &bookings);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                self.page.show_error(
                    "bookings-error",
                    &format!("Failed to load bookings: {}", err.user_message()),
                );
                Err(err)
            }
        }
    }

    /// `None` when the auth interceptor consumed the response.
    async fn fetch_vendor_bookings(&self) -> Result<Option<Vec<Booking>>, ViewError> {
        let response = self.api.vendor_dashboard_bookings().await?;
        if self.auth().handle(response.status) {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message: "Failed to fetch bookings".into(),
            });
        }
        let listing: Listing<Booking> = response.json()?;
        Ok(Some(listing.into_items()))
    }
}
