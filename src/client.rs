use std::sync::{atomic::AtomicBool, Arc};

use crate::actions::{RefreshTarget, UiAction};
use crate::api::ApiClient;
use crate::auth::AuthErrorInterceptor;
use crate::booking::BookingSession;
use crate::config::ViewConfig;
use crate::csrf::CredentialAttacher;
use crate::error::ViewError;
use crate::models::RsvpStatus;
use crate::notify::{NotificationChannel, ToastChannel};
use crate::page::Page;
use crate::session::EventScope;
use crate::status::{BookingStatusField, Control, GuestRef, Refresh, RsvpField};

/// The booking workflow client: request/response handlers layered over the
/// page renderer and the notification channel.
#[derive(Clone)]
pub struct ViewClient {
    pub(crate) api: ApiClient,
    pub(crate) page: Page,
    pub(crate) config: Arc<ViewConfig>,
    pub(crate) notifier: Arc<dyn NotificationChannel>,
    pub(crate) filtering: Arc<AtomicBool>,
}

/// What a dispatched [`UiAction`] left behind for the caller to hold on to.
#[derive(Debug)]
pub enum Dispatched {
    Booking(BookingSession),
    Scope(EventScope),
    Navigated(String),
    Updated,
    Ignored,
}

impl ViewClient {
    pub fn new(config: ViewConfig, page: Page) -> Result<Self, ViewError> {
        let api = ApiClient::new(&config.base_url, &page.cookies(), &config.csrf_header)?;
        let notifier: Arc<dyn NotificationChannel> =
            Arc::new(ToastChannel::new(page.clone(), config.toast_ttl()));
        Ok(Self {
            api,
            page,
            config: Arc::new(config),
            notifier,
            filtering: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationChannel>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub(crate) fn csrf(&self) -> CredentialAttacher {
        CredentialAttacher::new(self.page.clone(), &self.config.csrf_cookie)
    }

    pub(crate) fn auth(&self) -> AuthErrorInterceptor {
        AuthErrorInterceptor::new(
            self.page.clone(),
            self.notifier.clone(),
            &self.config.login_route,
            self.config.redirect_delay(),
        )
    }

    /// Runs the handler behind a delegated action. `input` is the value the
    /// user picked for select-style controls; `scope` is the event dialog
    /// currently open, if any.
    pub async fn dispatch(
        &self,
        action: UiAction,
        input: Option<&str>,
        scope: Option<&EventScope>,
    ) -> Result<Dispatched, ViewError> {
        tracing::debug!("dispatching {action:?}");
        match action {
            UiAction::ShowCreateEventForm => {
                self.toggle_create_form();
                Ok(Dispatched::Updated)
            }
            UiAction::ViewGuests { event_id } => {
                Ok(Dispatched::Scope(self.open_guest_manager(event_id).await))
            }
            UiAction::ViewVendors { event_id } => {
                Ok(Dispatched::Scope(self.open_event_vendors(event_id).await))
            }
            UiAction::BookVendor { vendor_id } => {
                Ok(Dispatched::Booking(self.open_booking(vendor_id).await))
            }
            UiAction::OpenCategory { category_id } => {
                Ok(Dispatched::Navigated(self.open_category(&category_id)))
            }
            UiAction::FilterCategory { category } => {
                self.filter_vendors_by_category(&category).await?;
                Ok(Dispatched::Navigated(self.page.location()))
            }
            UiAction::SetBookingStatus {
                booking_id,
                status,
                refresh,
            } => {
                let refresh = match refresh {
                    RefreshTarget::Vendor => Refresh::VendorBookings,
                    RefreshTarget::Event => scope.copied().map(Refresh::Scope).unwrap_or_default(),
                };
                let mut control = Control::new(status);
                self.mutate::<BookingStatusField>(&mut control, &booking_id, status, refresh)
                    .await?;
                Ok(Dispatched::Updated)
            }
            UiAction::ChangeRsvp {
                guest_id,
                event_id,
                current,
            } => {
                let Some(event_id) = event_id.or(scope.map(|s| s.event_id)) else {
                    return Err(ViewError::NoScope);
                };
                let Some(picked) = input else {
                    return Ok(Dispatched::Ignored);
                };
                let new_value: RsvpStatus = picked
                    .parse()
                    .map_err(|err: crate::models::UnknownStatus| ViewError::Validation(err.to_string()))?;
                if new_value == current {
                    return Ok(Dispatched::Ignored);
                }
                let mut control = Control::new(current);
                let guest = GuestRef { event_id, guest_id };
                self.mutate::<RsvpField>(&mut control, &guest, new_value, Refresh::Nothing)
                    .await?;
                Ok(Dispatched::Updated)
            }
        }
    }
}
