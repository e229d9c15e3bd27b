use std::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i32)]
pub enum BookingStatus {
    Pending = 0,
    Confirmed = 1,
    Cancelled = 2,
}

impl BookingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub created_on: DateTime<Utc>,
}

/// A validated booking request, not yet tied to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingProposal {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub number_of_guests: i32,
}

impl Booking {
    pub fn new(user_id: String, proposal: BookingProposal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name: proposal.name,
            email: proposal.email,
            phone: proposal.phone,
            booking_date: proposal.booking_date,
            booking_time: proposal.booking_time,
            number_of_guests: proposal.number_of_guests,
            status: BookingStatus::Pending,
            created_on: Utc::now(),
        }
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} at {}  ({} Guests)",
            self.name,
            self.booking_date,
            self.booking_time.format("%H:%M"),
            self.number_of_guests
        )
    }
}

/// Outcome of the capacity-guarded insert.
#[derive(Debug)]
pub enum SlotReservation {
    Reserved(Booking),
    /// The slot could not take the party; `booked` is the guest total already held.
    Full { booked: i64 },
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub search: Option<String>,
}
