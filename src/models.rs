use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub guest_count: Option<u64>,
    #[serde(default)]
    pub vendor_count: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Vendor {
    pub id: u64,
    pub business_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub services_count: Option<u64>,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Service {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Booking as returned by the event-bound and dashboard listings. The nested
/// records are partial views of the full entities.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Booking {
    pub id: u64,
    #[serde(default)]
    pub vendor: Option<BookingVendor>,
    #[serde(default)]
    pub service: Option<BookingService>,
    #[serde(default)]
    pub event: Option<BookingEvent>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct BookingVendor {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub business_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct BookingService {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct BookingEvent {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Guest {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub rsvp_status: RsvpStatus,
    #[serde(default)]
    pub event_id: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Invited,
    Attending,
    Declined,
    Waitlist,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::Invited,
        RsvpStatus::Attending,
        RsvpStatus::Declined,
        RsvpStatus::Waitlist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Invited => "invited",
            RsvpStatus::Attending => "attending",
            RsvpStatus::Declined => "declined",
            RsvpStatus::Waitlist => "waitlist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RsvpStatus::Invited => "Invited",
            RsvpStatus::Attending => "Attending",
            RsvpStatus::Declined => "Declined",
            RsvpStatus::Waitlist => "Waitlist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl FromStr for RsvpStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RsvpStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list endpoint payload. The API answers either a bare array or an object
/// wrapping the array under the entity's plural name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped(Wrapped<T>),
}

#[derive(Debug, Deserialize)]
pub struct Wrapped<T> {
    #[serde(
        alias = "events",
        alias = "vendors",
        alias = "bookings",
        alias = "services",
        alias = "guests",
        alias = "categories"
    )]
    items: Option<Vec<T>>,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped(wrapped) => wrapped.items.unwrap_or_default(),
        }
    }
}

/// Body of a successful `POST /events/bookings/`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BookingReceipt {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub booking: Option<ReceiptBooking>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptBooking {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_and_bare_listings_agree() {
        let wrapped: Listing<Event> =
            serde_json::from_str(r#"{"events":[{"id":3,"title":"Gala"}]}"#).unwrap();
        let bare: Listing<Event> = serde_json::from_str(r#"[{"id":3,"title":"Gala"}]"#).unwrap();
        assert_eq!(wrapped.into_items(), bare.into_items());
    }

    #[test]
    fn wrapper_without_known_key_is_empty() {
        let listing: Listing<Vendor> = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert!(listing.into_items().is_empty());
    }

    #[test]
    fn listing_items_need_no_default() {
        let listing: Listing<ReceiptBooking> =
            serde_json::from_str(r#"{"bookings":[{"id":4}]}"#).unwrap();
        let ids: Vec<u64> = listing.into_items().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn guest_defaults_to_invited() {
        let guest: Guest = serde_json::from_str(r#"{"id":1,"email":"a@x.com"}"#).unwrap();
        assert_eq!(guest.rsvp_status, RsvpStatus::Invited);
        assert_eq!(guest.name, None);
    }

    #[test]
    fn statuses_parse_wire_names() {
        assert_eq!("waitlist".parse::<RsvpStatus>(), Ok(RsvpStatus::Waitlist));
        assert_eq!(
            "completed".parse::<BookingStatus>(),
            Ok(BookingStatus::Completed)
        );
        assert!("maybe".parse::<RsvpStatus>().is_err());
    }
}
