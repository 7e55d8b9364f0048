//! HTML fragments for the entity lists. Every render replaces the target
//! container's content wholesale; interactive elements carry `data-*`
//! attributes that [`crate::actions`] reads back by delegation.

use crate::models::{Booking, BookingStatus, Category, Event, Guest, Service, Vendor};
use crate::page::Page;
use crate::utils::escape_html;

pub const EVENTS_EMPTY: &str = r##"<div class="text-muted">No events found. <a href="#" class="show-create-event-form">Create your first event</a></div>"##;
pub const VENDORS_EMPTY: &str = r#"<div class="text-muted">No vendors found.</div>"#;
pub const CATEGORIES_EMPTY: &str = r#"<div class="text-muted">No categories found.</div>"#;
pub const GUESTS_EMPTY: &str = r#"<div class="text-muted">No guests yet.</div>"#;
pub const EVENT_BOOKINGS_EMPTY: &str = r#"<div class="text-muted">No vendors booked yet. <a href="/vendors/" target="_blank">Browse vendors</a> to add services to this event.</div>"#;
pub const VENDOR_BOOKINGS_EMPTY: &str = r#"<p class="text-muted">No bookings found.</p>"#;

fn write(page: &Page, container_id: &str, html: String) -> bool {
    if page.set_html(container_id, html) {
        true
    } else {
        tracing::warn!("Element with id '{container_id}' not found in the DOM.");
        false
    }
}

fn text_or(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape_html(v),
        None => placeholder.to_string(),
    }
}

pub fn status_badge_class(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "bg-success",
        BookingStatus::Cancelled => "bg-danger",
        BookingStatus::Pending | BookingStatus::Completed => "bg-warning text-dark",
    }
}

pub fn event_card(event: &Event) -> String {
    format!(
        r#"<div class="col-md-6 col-lg-4 mb-4"><div class="card h-100"><div class="card-body"><h5 class="card-title">{title}</h5><p class="card-text"><i class="bi bi-calendar"></i> {date}<br><i class="bi bi-geo-alt"></i> {location}<br><i class="bi bi-people"></i> {guests} guests<br><i class="bi bi-briefcase"></i> {vendors} vendors</p><div class="btn-group w-100" role="group"><button class="btn btn-sm btn-outline-primary view-guests-btn" data-event-id="{id}">Guests</button><button class="btn btn-sm btn-outline-secondary view-vendors-btn" data-event-id="{id}">Vendors</button></div></div></div></div>"#,
        title = escape_html(&event.title),
        date = text_or(event.date.as_deref(), "Date TBD"),
        location = text_or(event.location.as_deref(), "Location TBD"),
        guests = event.guest_count.unwrap_or(0),
        vendors = event.vendor_count.unwrap_or(0),
        id = event.id,
    )
}

pub fn events_html(events: &[Event]) -> String {
    if events.is_empty() {
        return EVENTS_EMPTY.to_string();
    }
    events.iter().map(event_card).collect()
}

pub fn vendors_html(vendors: &[Vendor], default_image: &str) -> String {
    if vendors.is_empty() {
        return VENDORS_EMPTY.to_string();
    }
    vendors
        .iter()
        .map(|vendor| {
            let rating = vendor
                .average_rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| "0".to_string());
            format!(
                r#"<div class="col-md-4 col-lg-3 mb-4"><div class="card h-100 vendor-card"><img src="{pic}" class="card-img-top" alt="{name}"><div class="card-body"><h5 class="card-title">{name}</h5><p class="card-text">{description}</p><p class="card-text small text-muted mb-1"><i class="bi bi-geo-alt"></i> {location}<br><i class="bi bi-star-fill text-warning"></i> {rating} / 5 <span class="ms-2">{services} services</span></p><button class="btn btn-primary book-vendor-btn" data-id="{id}">Book Vendor</button><div class="booking-status mt-2" data-id="{id}"></div></div></div></div>"#,
                pic = text_or(vendor.profile_pic.as_deref(), &escape_html(default_image)),
                name = escape_html(&vendor.business_name),
                description = text_or(vendor.description.as_deref(), ""),
                location = text_or(vendor.location.as_deref(), "N/A"),
                rating = rating,
                services = vendor.services_count.unwrap_or(0),
                id = vendor.id,
            )
        })
        .collect()
}

pub fn categories_html(categories: &[Category]) -> String {
    if categories.is_empty() {
        return CATEGORIES_EMPTY.to_string();
    }
    categories
        .iter()
        .map(|cat| {
            format!(
                r#"<div class="card category-card m-2 d-inline-block" data-category="{id}"><div class="card-body text-center"><h5 class="card-title">{name}</h5><p class="card-text small text-muted">{description}</p></div></div>"#,
                id = cat.id,
                name = escape_html(&cat.name),
                description = text_or(cat.description.as_deref(), ""),
            )
        })
        .collect()
}

/// Guest rows for the event `event_id`. Rows whose guest record lacks an
/// event id are bound to `event_id`.
pub fn guests_html(guests: &[Guest], event_id: u64) -> String {
    if guests.is_empty() {
        return GUESTS_EMPTY.to_string();
    }
    guests
        .iter()
        .map(|guest| {
            let options: String = crate::models::RsvpStatus::ALL
                .iter()
                .map(|status| {
                    let selected = if *status == guest.rsvp_status {
                        " selected"
                    } else {
                        ""
                    };
                    format!(
                        r#"<option value="{value}"{selected}>{label}</option>"#,
                        value = status.as_str(),
                        label = status.label(),
                    )
                })
                .collect();
            format!(
                r#"<div class="list-group-item d-flex justify-content-between align-items-center"><div><strong>{name}</strong><br><small class="text-muted">{email}</small></div><select class="form-select form-select-sm guest-rsvp-select" data-guest-id="{id}" data-event-id="{event}">{options}</select></div>"#,
                name = text_or(guest.name.as_deref(), ""),
                email = escape_html(&guest.email),
                id = guest.id,
                event = guest.event_id.unwrap_or(event_id),
                options = options,
            )
        })
        .collect()
}

fn status_button(
    booking_id: u64,
    status: BookingStatus,
    class: &str,
    label: &str,
    refresh: &str,
) -> String {
    format!(
        r#"<button class="btn {class} btn-sm booking-status-btn" data-booking-id="{booking_id}" data-new-status="{status}" data-refresh="{refresh}">{label}</button>"#
    )
}

/// Bookings attached to one event, as shown in the event's vendor dialog.
pub fn event_bookings_html(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return EVENT_BOOKINGS_EMPTY.to_string();
    }
    bookings
        .iter()
        .map(|booking| {
            let status = booking.status.unwrap_or_default();
            let service = booking.service.as_ref();
            let price = service
                .and_then(|s| s.price.as_deref())
                .filter(|p| !p.is_empty())
                .map(|p| format!("Price: {}", escape_html(p)))
                .unwrap_or_default();
            let notes = booking
                .notes
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| format!(" • Notes: {}", escape_html(n)))
                .unwrap_or_default();
            let mut buttons = String::new();
            if status != BookingStatus::Confirmed {
                buttons.push_str(&status_button(
                    booking.id,
                    BookingStatus::Confirmed,
                    "btn-outline-success",
                    "Confirm",
                    "event",
                ));
            }
            if status != BookingStatus::Cancelled {
                buttons.push_str(&status_button(
                    booking.id,
                    BookingStatus::Cancelled,
                    "btn-outline-danger",
                    "Cancel",
                    "event",
                ));
            }
            format!(
                r#"<div class="card mb-3"><div class="card-body"><div class="row align-items-center"><div class="col-md-8"><h6 class="card-title mb-1">{vendor}</h6><p class="card-text mb-1"><strong>Service:</strong> {service}<br><small class="text-muted">{price}{notes}</small></p></div><div class="col-md-4 text-end"><div class="mb-2"><span class="badge {badge}" data-booking-id="{id}">{status}</span></div><div class="btn-group-vertical btn-group-sm" role="group">{buttons}</div></div></div></div></div>"#,
                vendor = text_or(
                    booking.vendor.as_ref().and_then(|v| v.business_name.as_deref()),
                    "Vendor"
                ),
                service = text_or(service.and_then(|s| s.title.as_deref()), "N/A"),
                badge = status_badge_class(status),
                id = booking.id,
            )
        })
        .collect()
}

/// Bookings received by the signed-in vendor.
pub fn vendor_bookings_html(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return VENDOR_BOOKINGS_EMPTY.to_string();
    }
    bookings
        .iter()
        .map(|booking| {
            let status = booking.status.unwrap_or_default();
            let event = booking.event.clone().unwrap_or_default();
            let date = event
                .date
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| format!("Date: {}", escape_html(d)))
                .unwrap_or_default();
            let location = event
                .location
                .as_deref()
                .filter(|l| !l.is_empty())
                .map(|l| format!(" • Location: {}", escape_html(l)))
                .unwrap_or_default();
            let notes = booking
                .notes
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| {
                    format!(
                        r#"<p class="mb-1"><small><strong>Notes:</strong> {}</small></p>"#,
                        escape_html(n)
                    )
                })
                .unwrap_or_default();

            let mut buttons = String::new();
            if status == BookingStatus::Pending {
                buttons.push_str(&status_button(
                    booking.id,
                    BookingStatus::Confirmed,
                    "btn-success",
                    "Confirm",
                    "vendor",
                ));
            }
            if status == BookingStatus::Confirmed {
                buttons.push_str(&status_button(
                    booking.id,
                    BookingStatus::Completed,
                    "btn-info",
                    "Complete",
                    "vendor",
                ));
            }
            if !matches!(status, BookingStatus::Cancelled | BookingStatus::Completed) {
                buttons.push_str(&status_button(
                    booking.id,
                    BookingStatus::Cancelled,
                    "btn-danger",
                    "Cancel",
                    "vendor",
                ));
            }

            format!(
                r#"<div class="border-bottom pb-3 mb-3"><div class="row align-items-center"><div class="col-md-8"><h6 class="mb-1">{title}</h6><p class="mb-1"><strong>Service:</strong> {service}<br><small class="text-muted">{date}{location}</small></p>{notes}</div><div class="col-md-4 text-end"><div class="mb-2"><span class="badge {badge}" data-booking-id="{id}">{status}</span></div><div class="btn-group-vertical btn-group-sm" role="group">{buttons}</div></div></div></div>"#,
                title = text_or(event.title.as_deref(), "Event"),
                service = text_or(
                    booking.service.as_ref().and_then(|s| s.title.as_deref()),
                    "N/A"
                ),
                badge = status_badge_class(status),
                id = booking.id,
            )
        })
        .collect()
}

pub fn service_options_html(services: &[Service]) -> String {
    if services.is_empty() {
        return r#"<option value="">No services found</option>"#.to_string();
    }
    services
        .iter()
        .map(|s| {
            format!(
                r#"<option value="{}">{} ({})</option>"#,
                s.id,
                escape_html(&s.title),
                text_or(s.price.as_deref(), "")
            )
        })
        .collect()
}

pub fn event_options_html(events: &[Event]) -> String {
    if events.is_empty() {
        return r#"<option value="">No events found</option>"#.to_string();
    }
    let mut html = r#"<option value="">Select an existing event...</option>"#.to_string();
    for ev in events {
        html.push_str(&format!(
            r#"<option value="{}">{} ({})</option>"#,
            ev.id,
            escape_html(&ev.title),
            text_or(ev.date.as_deref(), "Date TBD")
        ));
    }
    html
}

pub fn render_events(page: &Page, container_id: &str, events: &[Event]) -> bool {
    write(page, container_id, events_html(events))
}

pub fn render_vendors(page: &Page, container_id: &str, vendors: &[Vendor], default_image: &str) -> bool {
    write(page, container_id, vendors_html(vendors, default_image))
}

pub fn render_categories(page: &Page, container_id: &str, categories: &[Category]) -> bool {
    write(page, container_id, categories_html(categories))
}

pub fn render_guests(page: &Page, container_id: &str, guests: &[Guest], event_id: u64) -> bool {
    write(page, container_id, guests_html(guests, event_id))
}

pub fn render_event_bookings(page: &Page, container_id: &str, bookings: &[Booking]) -> bool {
    write(page, container_id, event_bookings_html(bookings))
}

pub fn render_vendor_bookings(page: &Page, container_id: &str, bookings: &[Booking]) -> bool {
    write(page, container_id, vendor_bookings_html(bookings))
}

/// Puts a newly created event at the top of the events list, dropping the
/// empty-state message if it is showing.
pub fn add_event_card(page: &Page, container_id: &str, event: &Event) -> bool {
    let showing_empty = page
        .html(container_id)
        .map(|html| html.contains("No events found"))
        .unwrap_or(false);
    if showing_empty {
        page.set_html(container_id, "");
    }
    let fresh = Event {
        guest_count: Some(0),
        vendor_count: Some(0),
        ..event.clone()
    };
    if page.prepend_html(container_id, &event_card(&fresh)) {
        true
    } else {
        tracing::warn!("Element with id '{container_id}' not found in the DOM.");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingService, BookingVendor, Listing, RsvpStatus};
    use scraper::{Html, Selector};

    fn select_all(html: &str, selector: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        fragment
            .select(&selector)
            .map(|el| el.value().attr("value").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn single_guest_row_preselects_status() {
        let guests = vec![Guest {
            id: 1,
            name: Some("Ana".into()),
            email: "a@x.com".into(),
            rsvp_status: RsvpStatus::Attending,
            event_id: None,
        }];
        let html = guests_html(&guests, 7);

        let fragment = Html::parse_fragment(&html);
        let rows = Selector::parse(".list-group-item").unwrap();
        assert_eq!(fragment.select(&rows).count(), 1);
        assert_eq!(select_all(&html, "option[selected]"), vec!["attending"]);
        assert!(html.contains(r#"data-event-id="7""#));
    }

    #[test]
    fn wrapped_and_bare_payloads_render_identically() {
        let wrapped: Listing<Event> = serde_json::from_str(
            r#"{"events":[{"id":1,"title":"Gala","date":null,"location":"Hall"}]}"#,
        )
        .unwrap();
        let bare: Listing<Event> =
            serde_json::from_str(r#"[{"id":1,"title":"Gala","date":null,"location":"Hall"}]"#)
                .unwrap();
        assert_eq!(
            events_html(&wrapped.into_items()),
            events_html(&bare.into_items())
        );
    }

    #[test]
    fn empty_lists_render_placeholders() {
        for html in [
            events_html(&[]),
            vendors_html(&[], "/img.jpg"),
            categories_html(&[]),
            guests_html(&[], 1),
            event_bookings_html(&[]),
            vendor_bookings_html(&[]),
        ] {
            assert!(!html.is_empty());
            assert!(html.contains("text-muted"));
        }
        assert!(events_html(&[]).contains("Create your first event"));
        assert!(event_bookings_html(&[]).contains("Browse vendors"));
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let event = Event {
            id: 2,
            title: "Picnic".into(),
            description: None,
            date: None,
            location: Some("  ".into()),
            guest_count: None,
            vendor_count: Some(3),
        };
        let html = events_html(&[event]);
        assert!(html.contains("Date TBD"));
        assert!(html.contains("Location TBD"));
        assert!(html.contains("0 guests"));
        assert!(html.contains("3 vendors"));
    }

    #[test]
    fn server_text_is_escaped() {
        let vendor = Vendor {
            id: 9,
            business_name: "<script>alert(1)</script>".into(),
            description: None,
            location: None,
            average_rating: Some(4.5),
            services_count: None,
            profile_pic: None,
        };
        let html = vendors_html(&[vendor], "/static/js/img/default_vendor.jpg");
        assert!(!html.contains("<script>"));
        assert!(html.contains("N/A"));
        assert!(html.contains("4.5 / 5"));
        assert!(html.contains("/static/js/img/default_vendor.jpg"));
    }

    #[test]
    fn dashboard_buttons_follow_status() {
        let booking = |id, status| Booking {
            id,
            vendor: Some(BookingVendor::default()),
            service: Some(BookingService {
                title: Some("DJ".into()),
                ..Default::default()
            }),
            event: None,
            status: Some(status),
            notes: None,
        };
        let pending = vendor_bookings_html(&[booking(1, BookingStatus::Pending)]);
        assert!(pending.contains(r#"data-new-status="confirmed""#));
        assert!(pending.contains(r#"data-new-status="cancelled""#));
        assert!(!pending.contains(r#"data-new-status="completed""#));

        let completed = vendor_bookings_html(&[booking(2, BookingStatus::Completed)]);
        assert!(!completed.contains("booking-status-btn"));

        let event_view = event_bookings_html(&[booking(3, BookingStatus::Confirmed)]);
        assert!(!event_view.contains(r#"data-new-status="confirmed""#));
        assert!(event_view.contains(r#"data-refresh="event""#));
    }

    #[test]
    fn render_is_idempotent_and_replaces_content() {
        let page = Page::parse(r#"<div id="events-section"><p>stale</p></div>"#, "/", "");
        let events = vec![Event {
            id: 1,
            title: "Gala".into(),
            description: None,
            date: Some("2025-06-01".into()),
            location: None,
            guest_count: Some(2),
            vendor_count: None,
        }];
        assert!(render_events(&page, "events-section", &events));
        let first = page.html("events-section").unwrap();
        render_events(&page, "events-section", &events);
        assert_eq!(page.html("events-section").unwrap(), first);
        assert!(!first.contains("stale"));
    }

    #[test]
    fn add_event_card_replaces_empty_state() {
        let page = Page::parse(r#"<div id="events-section"></div>"#, "/", "");
        render_events(&page, "events-section", &[]);
        let event = Event {
            id: 5,
            title: "Launch".into(),
            description: None,
            date: None,
            location: Some("Dock".into()),
            guest_count: Some(12),
            vendor_count: None,
        };
        assert!(add_event_card(&page, "events-section", &event));
        let html = page.html("events-section").unwrap();
        assert!(!html.contains("No events found"));
        assert!(html.starts_with(r#"<div class="col-md-6"#));
        assert!(html.contains("0 guests"));
    }
}
