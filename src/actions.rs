//! Event delegation. Rather than binding a handler to each rendered button,
//! the markup of a stable container is scanned for the interactive elements
//! the renderers emit and each one is turned into a [`UiAction`].

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::models::{BookingStatus, RsvpStatus};
use crate::page::Page;

static INTERACTIVE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".show-create-event-form, .view-guests-btn, .view-vendors-btn, .book-vendor-btn, \
         .category-card, .category-filter-btn, .booking-status-btn, .guest-rsvp-select",
    )
    .expect("interactive selector")
});
static SELECTED_OPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[selected]").expect("selected option selector"));

/// Which list is refetched after a booking status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Vendor,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    ShowCreateEventForm,
    ViewGuests { event_id: u64 },
    ViewVendors { event_id: u64 },
    BookVendor { vendor_id: u64 },
    OpenCategory { category_id: String },
    FilterCategory { category: String },
    SetBookingStatus {
        booking_id: u64,
        status: BookingStatus,
        refresh: RefreshTarget,
    },
    ChangeRsvp {
        guest_id: u64,
        event_id: Option<u64>,
        current: RsvpStatus,
    },
}

/// All actions reachable from `html`, in document order. Elements missing
/// the attributes they need are skipped.
pub fn delegate(html: &str) -> Vec<UiAction> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&INTERACTIVE_SELECTOR)
        .filter_map(|element| classify(&element))
        .collect()
}

/// Actions rendered inside the page container `container_id`.
pub fn actions_in(page: &Page, container_id: &str) -> Vec<UiAction> {
    page.html(container_id)
        .map(|html| delegate(&html))
        .unwrap_or_default()
}

fn classify(element: &ElementRef<'_>) -> Option<UiAction> {
    let value = element.value();
    let has = |class: &str| value.classes().any(|c| c == class);
    let number = |attr: &str| value.attr(attr).and_then(|v| v.trim().parse::<u64>().ok());

    if has("show-create-event-form") {
        return Some(UiAction::ShowCreateEventForm);
    }
    if has("view-guests-btn") {
        return number("data-event-id").map(|event_id| UiAction::ViewGuests { event_id });
    }
    if has("view-vendors-btn") {
        return number("data-event-id").map(|event_id| UiAction::ViewVendors { event_id });
    }
    if has("book-vendor-btn") {
        return number("data-id").map(|vendor_id| UiAction::BookVendor { vendor_id });
    }
    if has("category-card") {
        return value.attr("data-category").map(|id| UiAction::OpenCategory {
            category_id: id.to_string(),
        });
    }
    if has("category-filter-btn") {
        return value.attr("data-category").map(|c| UiAction::FilterCategory {
            category: c.to_string(),
        });
    }
    if has("booking-status-btn") {
        let status = value.attr("data-new-status")?.parse().ok()?;
        let refresh = match value.attr("data-refresh") {
            Some("event") => RefreshTarget::Event,
            _ => RefreshTarget::Vendor,
        };
        return number("data-booking-id").map(|booking_id| UiAction::SetBookingStatus {
            booking_id,
            status,
            refresh,
        });
    }
    if has("guest-rsvp-select") {
        let current = element
            .select(&SELECTED_OPTION_SELECTOR)
            .next()
            .and_then(|opt| opt.value().attr("value"))
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        return number("data-guest-id").map(|guest_id| UiAction::ChangeRsvp {
            guest_id,
            event_id: number("data-event-id"),
            current,
        });
    }
    None
}
