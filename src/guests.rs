use once_cell::sync::Lazy;
use reqwest::Method;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::client::ViewClient;
use crate::error::ViewError;
use crate::models::RsvpStatus;
use crate::page::Page;
use crate::session::EventScope;
use crate::utils::{clean_text, non_blank};

const GUEST_FORM_ERROR: &str = "guest-form-error";

static GUEST_EMAIL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".list-group-item .text-muted").expect("guest email selector")
});

#[derive(Debug, Clone, Default)]
pub struct GuestForm {
    pub name: String,
    pub email: String,
    pub rsvp_status: Option<RsvpStatus>,
}

#[derive(Debug, Serialize)]
struct NewGuest<'a> {
    name: &'a str,
    email: &'a str,
    rsvp_status: RsvpStatus,
}

/// Emails of the guests currently rendered in `#guests-list`.
pub fn listed_guest_emails(page: &Page) -> Vec<String> {
    let Some(html) = page.html("guests-list") else {
        return Vec::new();
    };
    let fragment = Html::parse_fragment(&html);
    fragment
        .select(&GUEST_EMAIL_SELECTOR)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .collect()
}

impl ViewClient {
    /// Adds a guest to the event in `scope`. Rejections are written to the
    /// form's inline error; auth failures are left to their toast.
    pub async fn add_guest(
        &self,
        scope: Option<&EventScope>,
        form: &mut GuestForm,
    ) -> Result<(), ViewError> {
        let result = self.try_add_guest(scope, form).await;
        match &result {
            Ok(()) => {
                *form = GuestForm::default();
                self.page.hide(GUEST_FORM_ERROR);
            }
            Err(ViewError::Unauthorized | ViewError::Forbidden) => {}
            Err(err) => self.page.show_error(GUEST_FORM_ERROR, &err.user_message()),
        }
        if result.is_ok() {
            if let Some(scope) = scope {
                if let Err(err) = self.reload_scope(&EventScope::guests(scope.event_id)).await {
                    tracing::error!("refreshing guests for event {}: {err}", scope.event_id);
                }
            }
        }
        result
    }

    async fn try_add_guest(
        &self,
        scope: Option<&EventScope>,
        form: &GuestForm,
    ) -> Result<(), ViewError> {
        let scope = scope.ok_or(ViewError::NoScope)?;

        let (Some(name), Some(email)) = (
            non_blank(Some(form.name.as_str())),
            non_blank(Some(form.email.as_str())),
        ) else {
            return Err(ViewError::Validation("Name and email are required.".into()));
        };

        // Only checks rows already rendered; the server is not asked.
        if listed_guest_emails(&self.page).iter().any(|e| e == email) {
            return Err(ViewError::Validation(
                "Guest is already in the guest list.".into(),
            ));
        }

        let token = self.csrf().require()?;
        let body = NewGuest {
            name,
            email,
            rsvp_status: form.rsvp_status.unwrap_or_default(),
        };
        let response = self
            .api
            .send_json(
                Method::POST,
                &format!("/events/{}/guests/", scope.event_id),
                &token,
                &body,
            )
            .await?;

        if let Some(err) = self.auth().intercept(response.status) {
            return Err(err);
        }
        if !response.is_success() {
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message: response.error_message("Failed to add guest"),
            });
        }
        Ok(())
    }
}
