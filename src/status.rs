//! Status changes on bookings and guests. Both go through the same flow:
//! token check, PATCH, auth interception, then commit or revert the control
//! that triggered the change.

use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::ViewClient;
use crate::error::ViewError;
use crate::models::{BookingStatus, RsvpStatus};
use crate::page::Page;
use crate::session::EventScope;

static SELECTED_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+selected(="[^"]*")?"#).expect("selected attribute regex"));
static DISABLED_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+disabled\b(="[^"]*")?"#).expect("disabled attribute regex"));

/// A server-side status field that a control can change.
pub trait StatusField {
    type Resource;
    type Value: Copy + PartialEq + Display;

    /// JSON key carrying the new value in the PATCH body.
    const BODY_KEY: &'static str;
    const LABEL: &'static str;
    /// Used when the server gives no error text.
    const FAILURE: &'static str;
    const ERROR_PREFIX: &'static str;

    fn path(resource: &Self::Resource) -> String;

    /// Attribute identifying the rendered controls bound to `resource`.
    fn control_marker(resource: &Self::Resource) -> String;

    /// Reflects a committed value in the rendered markup.
    fn on_commit(_page: &Page, _resource: &Self::Resource, _value: Self::Value) {}
}

pub struct BookingStatusField;

impl StatusField for BookingStatusField {
    type Resource = u64;
    type Value = BookingStatus;

    const BODY_KEY: &'static str = "status";
    const LABEL: &'static str = "Booking status";
    const FAILURE: &'static str = "Failed to update booking status";
    const ERROR_PREFIX: &'static str = "Error updating booking status: ";

    fn path(booking_id: &u64) -> String {
        format!("/events/bookings/{booking_id}/")
    }

    fn control_marker(booking_id: &u64) -> String {
        format!(r#"data-booking-id="{booking_id}""#)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestRef {
    pub event_id: u64,
    pub guest_id: u64,
}

pub struct RsvpField;

impl StatusField for RsvpField {
    type Resource = GuestRef;
    type Value = RsvpStatus;

    const BODY_KEY: &'static str = "rsvp_status";
    const LABEL: &'static str = "RSVP status";
    const FAILURE: &'static str = "Failed to update RSVP status";
    const ERROR_PREFIX: &'static str = "Failed to update RSVP status: ";

    fn path(guest: &GuestRef) -> String {
        format!("/events/{}/guests/{}/", guest.event_id, guest.guest_id)
    }

    fn control_marker(guest: &GuestRef) -> String {
        format!(r#"data-guest-id="{}""#, guest.guest_id)
    }

    fn on_commit(page: &Page, guest: &GuestRef, value: RsvpStatus) {
        page.patch("guests-list", |html| select_option(html, guest.guest_id, value));
    }
}

/// Moves the `selected` marker of guest `guest_id`'s RSVP select to `value`.
fn select_option(html: &str, guest_id: u64, value: RsvpStatus) -> String {
    let marker = format!(r#"data-guest-id="{guest_id}""#);
    let Some(start) = html.find(&marker) else {
        return html.to_string();
    };
    let Some(len) = html[start..].find("</select>") else {
        return html.to_string();
    };
    let end = start + len;
    let cleared = SELECTED_ATTR.replace_all(&html[start..end], "");
    let wanted = format!(r#"<option value="{value}""#);
    let updated = cleared.replacen(&wanted, &format!("{wanted} selected"), 1);
    format!("{}{}{}", &html[..start], updated, &html[end..])
}

/// Adds or drops `disabled` on each select or button tag carrying `marker`.
fn set_disabled(html: &str, marker: &str, disabled: bool) -> String {
    let pattern = format!(r"<(?:select|button)\b[^>]*{}[^>]*>", regex::escape(marker));
    let Ok(tags) = Regex::new(&pattern) else {
        return html.to_string();
    };
    tags.replace_all(html, |caps: &regex::Captures<'_>| {
        let tag = DISABLED_ATTR.replace_all(&caps[0], "").into_owned();
        if disabled {
            if let Some(open) = tag.strip_suffix('>') {
                return format!("{open} disabled>");
            }
        }
        tag
    })
    .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Interactive,
    Loading,
}

/// The widget a status change originates from: a select or a button.
#[derive(Debug, Clone)]
pub struct Control<V> {
    committed: V,
    value: V,
    state: ControlState,
    flash_until: Option<DateTime<Utc>>,
}

impl<V: Copy + PartialEq> Control<V> {
    pub fn new(committed: V) -> Self {
        Self {
            committed,
            value: committed,
            state: ControlState::Interactive,
            flash_until: None,
        }
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn committed(&self) -> V {
        self.committed
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_interactive(&self) -> bool {
        self.state == ControlState::Interactive
    }

    pub fn is_flashing(&self, now: DateTime<Utc>) -> bool {
        self.flash_until.map(|until| now < until).unwrap_or(false)
    }

    fn pick(&mut self, value: V) {
        self.value = value;
    }

    fn begin(&mut self) {
        self.state = ControlState::Loading;
    }

    fn commit(&mut self, flash: Duration) {
        self.committed = self.value;
        self.state = ControlState::Interactive;
        self.flash_until = chrono::Duration::from_std(flash)
            .ok()
            .map(|flash| Utc::now() + flash);
    }

    fn revert(&mut self) {
        self.value = self.committed;
        self.state = ControlState::Interactive;
    }
}

/// What to refetch after a committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Refresh {
    #[default]
    Nothing,
    VendorBookings,
    Scope(EventScope),
}

impl ViewClient {
    pub async fn mutate<F: StatusField>(
        &self,
        control: &mut Control<F::Value>,
        resource: &F::Resource,
        new_value: F::Value,
        refresh: Refresh,
    ) -> Result<(), ViewError> {
        control.pick(new_value);

        let token = match self.csrf().require() {
            Ok(token) => token,
            Err(err) => {
                self.notifier.error(&err.to_string());
                control.revert();
                return Err(err);
            }
        };

        control.begin();
        self.show_control_state::<F>(resource, control.state());
        if let Err(err) = self.send_status::<F>(resource, new_value, &token).await {
            control.revert();
            self.show_control_state::<F>(resource, control.state());
            return Err(err);
        }

        self.notifier
            .success(&format!("{} updated to {new_value}", F::LABEL));
        control.commit(self.config.success_flash());
        self.show_control_state::<F>(resource, control.state());
        F::on_commit(&self.page, resource, new_value);
        self.refresh(refresh).await;
        Ok(())
    }

    /// Mirrors the control's state onto its rendered markup.
    fn show_control_state<F: StatusField>(&self, resource: &F::Resource, state: ControlState) {
        let marker = F::control_marker(resource);
        let loading = state == ControlState::Loading;
        let changed = self
            .page
            .patch_all(|html| set_disabled(html, &marker, loading));
        tracing::trace!("{marker}: {state:?} on {changed} container(s)");
    }

    async fn send_status<F: StatusField>(
        &self,
        resource: &F::Resource,
        new_value: F::Value,
        token: &str,
    ) -> Result<(), ViewError> {
        let mut body = Map::new();
        body.insert(F::BODY_KEY.to_string(), Value::String(new_value.to_string()));

        let response = match self
            .api
            .send_json(Method::PATCH, &F::path(resource), token, &body)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("{}{err}", F::ERROR_PREFIX);
                self.notifier
                    .error(&format!("{}{}", F::ERROR_PREFIX, err.user_message()));
                return Err(err);
            }
        };

        if let Some(err) = self.auth().intercept(response.status) {
            return Err(err);
        }

        if !response.is_success() {
            let message = response.error_message(F::FAILURE);
            self.notifier
                .error(&format!("{}{message}", F::ERROR_PREFIX));
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn refresh(&self, refresh: Refresh) {
        let outcome = match refresh {
            Refresh::Nothing => Ok(()),
            Refresh::VendorBookings => self.load_vendor_bookings().await,
            Refresh::Scope(scope) => self.reload_scope(&scope).await,
        };
        if let Err(err) = outcome {
            tracing::error!("refresh after status change failed: {err}");
        }
    }
}
