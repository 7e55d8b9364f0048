mod common;

use evently_lib::error::NO_SCOPE_MESSAGE;
use evently_lib::models::{BookingStatus, RsvpStatus};
use evently_lib::{
    delegate, Control, Dispatched, EventScope, GuestForm, GuestRef, Refresh, RefreshTarget,
    RsvpField, UiAction, ViewError,
};
use mockito::{Matcher, Server};
use serde_json::json;

const GUEST_DIALOG: &str = r#"
<div id="events-section"></div>
<div id="guestModal" class="modal">
  <div id="guests-loading" style="display: none">Loading...</div>
  <div id="guests-list" class="list-group"></div>
  <div id="guest-form-error" class="alert alert-danger d-none"></div>
</div>
<div id="vendorModal" class="modal">
  <div id="vendors-loading" style="display: none">Loading...</div>
  <div id="vendors-list"></div>
</div>"#;

fn ana() -> serde_json::Value {
    json!([{"id": 1, "name": "Ana", "email": "a@x.com", "rsvp_status": "attending"}])
}

#[tokio::test]
async fn add_guest_without_scope_sends_nothing() {
    let mut server = Server::new_async().await;
    let post = server
        .mock("POST", Matcher::Regex(r"^/events/\d+/guests/$".into()))
        .expect(0)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let mut form = GuestForm {
        name: "Bo".into(),
        email: "b@x.com".into(),
        rsvp_status: None,
    };
    let err = client.add_guest(None, &mut form).await.unwrap_err();

    post.assert_async().await;
    assert_eq!(err, ViewError::NoScope);
    assert_eq!(page.html("guest-form-error").as_deref(), Some(NO_SCOPE_MESSAGE));
    assert_eq!(page.is_hidden("guest-form-error"), Some(false));
    assert_eq!(form.name, "Bo");
}

#[tokio::test]
async fn opening_guest_manager_renders_rows() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/events/7/guests/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"guests": ana()}).to_string())
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_guest_manager(7).await;

    assert_eq!(scope, EventScope::guests(7));
    assert!(page.is_dialog_open("guestModal"));
    assert_eq!(page.is_hidden("guests-loading"), Some(true));
    let actions = delegate(&page.html("guests-list").unwrap());
    assert_eq!(
        actions,
        vec![UiAction::ChangeRsvp {
            guest_id: 1,
            event_id: Some(7),
            current: RsvpStatus::Attending
        }]
    );
}

#[tokio::test]
async fn failed_guest_fetch_shows_retry_message() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/events/7/guests/")
        .with_status(500)
        .with_body("<h1>Server Error</h1>")
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    client.open_guest_manager(7).await;

    assert!(page
        .html("guests-list")
        .unwrap()
        .contains("Error loading guests. Please try again."));
}

#[tokio::test]
async fn duplicate_email_is_rejected_locally() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/events/7/guests/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ana().to_string())
        .create_async()
        .await;
    let post = server
        .mock("POST", "/events/7/guests/")
        .expect(0)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_guest_manager(7).await;
    let mut form = GuestForm {
        name: "Ana again".into(),
        email: "a@x.com".into(),
        rsvp_status: None,
    };
    let err = client.add_guest(Some(&scope), &mut form).await.unwrap_err();

    post.assert_async().await;
    assert_eq!(
        err,
        ViewError::Validation("Guest is already in the guest list.".into())
    );
    assert!(page.html("guest-form-error").unwrap().contains("already in the guest list"));
}

#[tokio::test]
async fn added_guest_resets_form_and_refetches() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/events/7/guests/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ana().to_string())
        .expect(2)
        .create_async()
        .await;
    let post = server
        .mock("POST", "/events/7/guests/")
        .match_header("x-csrftoken", common::TOKEN)
        .match_body(Matcher::Json(json!({
            "name": "Bo",
            "email": "b@x.com",
            "rsvp_status": "invited"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":2,"name":"Bo","email":"b@x.com","rsvp_status":"invited"}"#)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_guest_manager(7).await;
    let mut form = GuestForm {
        name: " Bo ".into(),
        email: "b@x.com".into(),
        rsvp_status: None,
    };
    client.add_guest(Some(&scope), &mut form).await.unwrap();

    post.assert_async().await;
    list.assert_async().await;
    assert!(form.name.is_empty());
    assert_eq!(page.is_hidden("guest-form-error"), Some(true));
}

#[tokio::test]
async fn server_rejection_uses_server_text() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/events/7/guests/")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Invalid email address"}"#)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = EventScope::guests(7);
    let mut form = GuestForm {
        name: "Bo".into(),
        email: "bogus".into(),
        rsvp_status: Some(RsvpStatus::Waitlist),
    };
    let err = client.add_guest(Some(&scope), &mut form).await.unwrap_err();

    assert_eq!(
        err,
        ViewError::Api {
            status: 400,
            message: "Invalid email address".into()
        }
    );
    assert_eq!(page.html("guest-form-error").as_deref(), Some("Invalid email address"));
    assert_eq!(form.email, "bogus");
}

#[tokio::test]
async fn failed_rsvp_change_reverts_control() {
    let mut server = Server::new_async().await;
    server
        .mock("PATCH", "/events/7/guests/1/")
        .match_body(Matcher::Json(json!({"rsvp_status": "declined"})))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Invalid status."}"#)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let mut control = Control::new(RsvpStatus::Attending);
    let guest = GuestRef {
        event_id: 7,
        guest_id: 1,
    };
    let err = client
        .mutate::<RsvpField>(&mut control, &guest, RsvpStatus::Declined, Refresh::Nothing)
        .await
        .unwrap_err();

    assert!(matches!(err, ViewError::Api { status: 400, .. }));
    assert_eq!(control.value(), RsvpStatus::Attending);
    assert!(control.is_interactive());
    assert_eq!(
        common::toast_messages(&page),
        vec!["Failed to update RSVP status: Invalid status.".to_string()]
    );
}

#[tokio::test]
async fn rsvp_change_without_token_never_patches() {
    let mut server = Server::new_async().await;
    let patch = server
        .mock("PATCH", "/events/7/guests/1/")
        .expect(0)
        .create_async()
        .await;
    let (client, page) = common::client(
        &server,
        &common::document_without_token("events", GUEST_DIALOG),
        "/events/page/",
    );

    let mut control = Control::new(RsvpStatus::Invited);
    let guest = GuestRef {
        event_id: 7,
        guest_id: 1,
    };
    let err = client
        .mutate::<RsvpField>(&mut control, &guest, RsvpStatus::Attending, Refresh::Nothing)
        .await
        .unwrap_err();

    patch.assert_async().await;
    assert_eq!(err, ViewError::Security);
    assert_eq!(control.value(), RsvpStatus::Invited);
    assert!(control.is_interactive());
    assert_eq!(page.toasts().len(), 1);
}

#[tokio::test]
async fn rsvp_dispatch_commits_and_reselects_option() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/events/7/guests/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ana().to_string())
        .create_async()
        .await;
    server
        .mock("PATCH", "/events/7/guests/1/")
        .match_header("x-csrftoken", common::TOKEN)
        .match_body(Matcher::Json(json!({"rsvp_status": "waitlist"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1,"email":"a@x.com","rsvp_status":"waitlist"}"#)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_guest_manager(7).await;
    let action = delegate(&page.html("guests-list").unwrap()).remove(0);
    let outcome = client
        .dispatch(action, Some("waitlist"), Some(&scope))
        .await
        .unwrap();

    assert!(matches!(outcome, Dispatched::Updated));
    assert_eq!(
        common::toast_messages(&page),
        vec!["RSVP status updated to waitlist".to_string()]
    );
    let reselected = delegate(&page.html("guests-list").unwrap());
    assert_eq!(
        reselected,
        vec![UiAction::ChangeRsvp {
            guest_id: 1,
            event_id: Some(7),
            current: RsvpStatus::Waitlist
        }]
    );
}

#[tokio::test]
async fn event_booking_status_refreshes_open_scope() {
    let mut server = Server::new_async().await;
    let bookings = server
        .mock("GET", "/events/7/vendors/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"bookings": [{
                "id": 3,
                "status": "pending",
                "vendor": {"id": 5, "business_name": "Bloom"},
                "service": {"title": "Bouquets", "price": "120.00"}
            }]})
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    server
        .mock("PATCH", "/events/bookings/3/")
        .match_body(Matcher::Json(json!({"status": "confirmed"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_event_vendors(7).await;
    let actions = delegate(&page.html("vendors-list").unwrap());
    assert_eq!(
        actions[0],
        UiAction::SetBookingStatus {
            booking_id: 3,
            status: BookingStatus::Confirmed,
            refresh: RefreshTarget::Event
        }
    );

    client
        .dispatch(actions[0].clone(), None, Some(&scope))
        .await
        .unwrap();

    bookings.assert_async().await;
    assert_eq!(
        common::toast_messages(&page),
        vec!["Booking status updated to confirmed".to_string()]
    );
}

#[tokio::test]
async fn forbidden_rsvp_change_reverts_with_single_notice() {
    let mut server = Server::new_async().await;
    server
        .mock("PATCH", "/events/7/guests/1/")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Not your event"}"#)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let mut control = Control::new(RsvpStatus::Invited);
    let guest = GuestRef {
        event_id: 7,
        guest_id: 1,
    };
    let err = client
        .mutate::<RsvpField>(&mut control, &guest, RsvpStatus::Attending, Refresh::Nothing)
        .await
        .unwrap_err();

    assert_eq!(err, ViewError::Forbidden);
    assert_eq!(control.value(), RsvpStatus::Invited);
    assert!(control.is_interactive());
    assert_eq!(
        common::toast_messages(&page),
        vec!["Access denied. You don't have permission for this action.".to_string()]
    );
    assert_eq!(page.location(), "/events/page/");
}

#[tokio::test]
async fn failed_rsvp_dispatch_leaves_select_enabled_on_old_value() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/events/7/guests/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ana().to_string())
        .create_async()
        .await;
    server
        .mock("PATCH", "/events/7/guests/1/")
        .with_status(500)
        .create_async()
        .await;
    let (client, page) = common::client(&server, &common::document("events", GUEST_DIALOG), "/events/page/");

    let scope = client.open_guest_manager(7).await;
    let before = page.html("guests-list").unwrap();
    let action = delegate(&before).remove(0);
    let err = client
        .dispatch(action, Some("declined"), Some(&scope))
        .await
        .unwrap_err();

    assert!(matches!(err, ViewError::Api { status: 500, .. }));
    let after = page.html("guests-list").unwrap();
    assert!(!after.contains("disabled"));
    assert_eq!(after, before);
    assert_eq!(
        delegate(&after),
        vec![UiAction::ChangeRsvp {
            guest_id: 1,
            event_id: Some(7),
            current: RsvpStatus::Attending
        }]
    );
}
