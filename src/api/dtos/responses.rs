use serde::Serialize;
use crate::domain::models::booking::Booking;

/// A booking shaped for the list page.
#[derive(Serialize)]
pub struct BookingView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub weekday: String,
    pub time: String,
    pub guests: i32,
    pub status: &'static str,
}

impl From<&Booking> for BookingView {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.clone(),
            name: b.name.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            date: b.booking_date.format("%Y-%m-%d").to_string(),
            weekday: b.booking_date.format("%A").to_string(),
            time: b.booking_time.format("%H:%M").to_string(),
            guests: b.number_of_guests,
            status: b.status.label(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
