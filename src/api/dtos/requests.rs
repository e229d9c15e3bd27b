use serde::{Deserialize, Serialize};

/// Raw booking form fields, kept as typed-in text so they can be re-rendered.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingFormData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_date: String,
    pub booking_time: String,
    pub number_of_guests: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminBookingQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub q: Option<String>,
}
