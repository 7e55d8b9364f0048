use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::client::ViewClient;
use crate::error::{ErrorBody, ViewError};
use crate::models::{BookingReceipt, Event, Service};
use crate::render;
use crate::utils::non_blank;

const DIALOG: &str = "bookingModal";
const FORM: &str = "booking-form";
const DIALOG_ERROR: &str = "booking-modal-error";
const SERVICE_SELECT: &str = "booking-service";
const EVENT_SELECT: &str = "booking-event";
const EVENT_SELECT_GROUP: &str = "event-select-group";
const EVENT_CREATE_GROUP: &str = "event-create-group";

pub const PLANNER_ONLY: &str = "You can only book vendors for events you created.";
pub const PLANNERS_CREATE: &str =
    "Only event planners can create new events. Please contact an administrator.";
pub const NO_PERMISSION: &str = "You don't have permission to book this vendor.";
pub const PERMISSION_DENIED: &str =
    "Permission denied. Please make sure you're logged in as an event planner.";
pub const MISSING_FIELDS: &str = "Please fill in all required fields.";
pub const DUPLICATE_BOOKING: &str = "You've already booked this vendor for this event.";
pub const UNAVAILABLE: &str = "The selected vendor or service is no longer available.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const OFFLINE: &str =
    "Unable to submit booking. Please check your internet connection and try again.";

static CONFIRMATION_ALERT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="[^"]*\bbooking-confirmation\b[^"]*">.*?</div>"#)
        .expect("confirmation alert regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    Closed,
    Loading,
    Ready,
    Submitting,
    Succeeded,
    Failed(String),
}

/// One open booking dialog, bound to the vendor it was opened for.
#[derive(Debug, Clone)]
pub struct BookingSession {
    vendor_id: u64,
    state: BookingState,
    pub services: Vec<Service>,
    pub events: Vec<Event>,
    pub event_select_visible: bool,
    pub create_hint: Option<&'static str>,
    confirmation: Option<String>,
}

impl BookingSession {
    pub fn new(vendor_id: u64) -> Self {
        Self {
            vendor_id,
            state: BookingState::Closed,
            services: Vec::new(),
            events: Vec::new(),
            event_select_visible: true,
            create_hint: None,
            confirmation: None,
        }
    }

    pub fn vendor_id(&self) -> u64 {
        self.vendor_id
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            BookingState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    fn can_submit(&self) -> bool {
        matches!(self.state, BookingState::Ready | BookingState::Failed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub service_id: Option<u64>,
    pub event_id: Option<u64>,
    pub event_name: Option<String>,
    pub event_date: Option<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingRequest {
    pub vendor_id: u64,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
}

impl BookingRequest {
    /// A new event (name and date both filled) wins over a selected one.
    pub fn build(vendor_id: u64, form: &BookingForm) -> Self {
        let mut request = Self {
            vendor_id,
            notes: form.notes.clone(),
            service_id: form.service_id,
            event_name: None,
            event_date: None,
            event_id: None,
        };
        match (
            non_blank(form.event_name.as_deref()),
            non_blank(form.event_date.as_deref()),
        ) {
            (Some(name), Some(date)) => {
                request.event_name = Some(name.to_string());
                request.event_date = Some(date.to_string());
            }
            _ => request.event_id = form.event_id,
        }
        request
    }
}

/// Friendly text for a rejected booking. A structured `code` wins over the
/// wording of the `error` text.
pub fn booking_failure_message(status: StatusCode, body: &str) -> String {
    let parsed = ErrorBody::parse(body);

    let by_code = parsed
        .as_ref()
        .and_then(|b| b.code.as_deref())
        .and_then(|code| match code {
            "not_event_planner" => Some(PLANNER_ONLY),
            "planner_required" => Some(PLANNERS_CREATE),
            "missing_fields" => Some(MISSING_FIELDS),
            "duplicate_booking" => Some(DUPLICATE_BOOKING),
            "not_found" => Some(UNAVAILABLE),
            _ => None,
        });
    if let Some(message) = by_code {
        return message.to_string();
    }

    if status == StatusCode::FORBIDDEN {
        let Some(body) = parsed else {
            return PERMISSION_DENIED.to_string();
        };
        let error = body.error.unwrap_or_default();
        let message = if error.contains("event planner") {
            PLANNER_ONLY
        } else if error.contains("planners can create") {
            PLANNERS_CREATE
        } else {
            NO_PERMISSION
        };
        return message.to_string();
    }

    let error = parsed.and_then(|b| b.error).unwrap_or_default();
    let message = if error.contains("required") {
        MISSING_FIELDS
    } else if error.contains("already exists") {
        DUPLICATE_BOOKING
    } else if error.contains("not found") {
        UNAVAILABLE
    } else {
        GENERIC_FAILURE
    };
    message.to_string()
}

impl ViewClient {
    /// Opens the booking dialog for `vendor_id`, loading the vendor's
    /// services and the planner's events side by side.
    pub async fn open_booking(&self, vendor_id: u64) -> BookingSession {
        let mut session = BookingSession::new(vendor_id);
        session.state = BookingState::Loading;

        self.page.hide(DIALOG_ERROR);
        self.page
            .patch(FORM, |html| CONFIRMATION_ALERT.replace_all(html, "").into_owned());
        self.page.show(EVENT_SELECT_GROUP);
        self.page.show(EVENT_CREATE_GROUP);
        self.page
            .set_html(SERVICE_SELECT, r#"<option value="">Loading...</option>"#);

        let (services, events) = tokio::join!(
            self.api.vendor_services(vendor_id),
            self.api.my_events()
        );

        match services {
            Ok(services) => session.services = services,
            Err(err) => tracing::error!("services for vendor {vendor_id}: {err}"),
        }
        self.page
            .set_html(SERVICE_SELECT, render::service_options_html(&session.services));

        match events {
            Ok(events) if !events.is_empty() => {
                self.page
                    .set_html(EVENT_SELECT, render::event_options_html(&events));
                session.events = events;
                session.event_select_visible = true;
                session.create_hint = Some("Or create a new event below:");
            }
            Ok(_) => {
                self.page.set_html(EVENT_SELECT, render::event_options_html(&[]));
                session.event_select_visible = false;
                session.create_hint = Some("Create a new event for this booking:");
            }
            Err(err) => {
                tracing::error!("events for booking dialog: {err}");
                self.page
                    .set_html(EVENT_SELECT, r#"<option value="">Error loading events</option>"#);
                session.event_select_visible = false;
            }
        }
        if !session.event_select_visible {
            self.page.hide(EVENT_SELECT_GROUP);
        }

        self.page.open_dialog(DIALOG);
        session.state = BookingState::Ready;
        session
    }

    pub async fn submit_booking(
        &self,
        session: &mut BookingSession,
        form: &BookingForm,
    ) -> Result<BookingReceipt, ViewError> {
        if !session.can_submit() {
            return Err(ViewError::InvalidState(format!(
                "booking dialog cannot submit while {:?}",
                session.state
            )));
        }

        let request = BookingRequest::build(session.vendor_id, form);
        let token = match self.csrf().require() {
            Ok(token) => token,
            Err(err) => {
                self.page.show_error(DIALOG_ERROR, &err.to_string());
                return Err(err);
            }
        };

        session.state = BookingState::Submitting;
        let response = match self
            .api
            .send_json(Method::POST, "/events/bookings/", &token, &request)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("booking submit for vendor {}: {err}", session.vendor_id);
                self.fail_booking(session, OFFLINE);
                return Err(err);
            }
        };

        if response.status == StatusCode::UNAUTHORIZED {
            if let Some(err) = self.auth().intercept(response.status) {
                session.state = BookingState::Failed(err.to_string());
                return Err(err);
            }
        }

        if !response.is_success() {
            let message = booking_failure_message(response.status, &response.body);
            self.fail_booking(session, &message);
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message,
            });
        }

        let receipt: BookingReceipt = response.json().unwrap_or_else(|err| {
            tracing::warn!("booking response was not understood: {err}");
            BookingReceipt::default()
        });
        if let Some(error) = non_blank(receipt.error.as_deref()) {
            let message = error.to_string();
            self.fail_booking(session, &message);
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message,
            });
        }

        let status = receipt.status.unwrap_or_default();
        self.mark_vendor_booked(session.vendor_id, &format!("✓ Booking {status}"));

        let booking_ref = receipt
            .booking
            .as_ref()
            .map(|b| format!(" (Booking #{})", b.id))
            .unwrap_or_default();
        let confirmation = format!(
            "Booking successful! Your booking request has been submitted and is {status}.{booking_ref}"
        );
        let alert = format!(
            r#"<div class="alert alert-success mt-3 booking-confirmation"><strong>Booking successful!</strong> Your booking request has been submitted and is {status}.{booking_ref}</div>"#
        );
        self.page.patch(FORM, |html| format!("{html}{alert}"));
        self.page.hide(DIALOG_ERROR);
        session.confirmation = Some(confirmation);
        session.state = BookingState::Succeeded;
        self.schedule_booking_close(alert);

        Ok(receipt)
    }

    fn fail_booking(&self, session: &mut BookingSession, message: &str) {
        self.page.show_error(DIALOG_ERROR, message);
        session.state = BookingState::Failed(message.to_string());
    }

    /// Rewrites the `.booking-status[data-id=vendor]` slot in the vendor list,
    /// whatever classes an earlier booking left on it.
    fn mark_vendor_booked(&self, vendor_id: u64, text: &str) {
        let slot = match Regex::new(&format!(
            r#"<div class="booking-status(?: [^"]*)?" data-id="{vendor_id}">"#
        )) {
            Ok(slot) => slot,
            Err(err) => {
                tracing::error!("status slot pattern for vendor {vendor_id}: {err}");
                return;
            }
        };
        let text = crate::utils::escape_html(text);
        let found = self.page.patch("vendors-section", |html| {
            let Some(open) = slot.find(html) else {
                return html.to_string();
            };
            let Some(len) = html[open.end()..].find("</div>") else {
                return html.to_string();
            };
            format!(
                r#"{}<div class="booking-status mt-2 text-success" data-id="{vendor_id}">{text}{}"#,
                &html[..open.start()],
                &html[open.end() + len..]
            )
        });
        if !found {
            tracing::debug!("no vendor list on this page to mark vendor {vendor_id}");
        }
    }

    fn schedule_booking_close(&self, alert: String) {
        let page = self.page.clone();
        let delay = self.config.dialog_close_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            page.close_dialog(DIALOG);
            page.patch(FORM, |html| html.replacen(&alert, "", 1));
        });
    }
}
