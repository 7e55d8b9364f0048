use reqwest::Method;
use serde::Serialize;

use crate::client::ViewClient;
use crate::error::ViewError;
use crate::models::Event;
use crate::render;
use crate::utils::non_blank;

const CREATE_FORM: &str = "create-event-form";
const CREATE_ERROR: &str = "create-event-error";
const EVENTS_SECTION: &str = "events-section";

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
}

impl EventForm {
    fn validate(&self) -> Result<(), ViewError> {
        let required = [&self.title, &self.date, &self.location];
        if required.iter().any(|v| non_blank(Some(v.as_str())).is_none()) {
            return Err(ViewError::Validation(
                "Title, date, and location are required.".into(),
            ));
        }
        Ok(())
    }
}

impl ViewClient {
    pub fn toggle_create_form(&self) {
        self.page.toggle(CREATE_FORM);
    }

    /// Creates an event and puts its card at the top of the events list.
    pub async fn create_event(&self, form: &mut EventForm) -> Result<Event, ViewError> {
        match self.try_create_event(form).await {
            Ok(event) => {
                render::add_event_card(&self.page, EVENTS_SECTION, &event);
                *form = EventForm::default();
                self.page.hide(CREATE_ERROR);
                self.page.hide(CREATE_FORM);
                Ok(event)
            }
            Err(err) => {
                if !matches!(err, ViewError::Unauthorized | ViewError::Forbidden) {
                    self.page.show_error(CREATE_ERROR, &err.user_message());
                }
                Err(err)
            }
        }
    }

    async fn try_create_event(&self, form: &EventForm) -> Result<Event, ViewError> {
        form.validate()?;
        let token = self.csrf().require()?;
        let response = self
            .api
            .send_json(Method::POST, "/events/create/", &token, form)
            .await?;
        if let Some(err) = self.auth().intercept(response.status) {
            return Err(err);
        }
        if !response.is_success() {
            return Err(ViewError::Api {
                status: response.status.as_u16(),
                message: response.error_message("Failed to create event"),
            });
        }
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_date_and_location_are_required() {
        let form = EventForm {
            title: "Gala".into(),
            description: String::new(),
            date: "2025-06-01".into(),
            location: " ".into(),
        };
        assert_eq!(
            form.validate(),
            Err(ViewError::Validation(
                "Title, date, and location are required.".into()
            ))
        );

        let ok = EventForm {
            location: "Hall".into(),
            ..form
        };
        assert!(ok.validate().is_ok());
    }
}
