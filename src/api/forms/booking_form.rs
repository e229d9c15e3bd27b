use std::collections::BTreeMap;
use std::sync::LazyLock;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;
use validator::ValidateEmail;
use crate::api::dtos::requests::BookingFormData;
use crate::domain::models::booking::BookingProposal;
use crate::domain::services::booking_rules::BookingRules;

pub const NAME_MAX_LEN: usize = 100;
pub const PHONE_MAX_LEN: usize = 17;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone pattern is a valid regex"));

const REQUIRED: &str = "This field is required.";

/// Messages attached to a submitted form, per field and for the form as a whole.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<&'static str, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.fields.values().flatten().chain(self.non_field.iter()).cloned().collect()
    }
}

/// Input hints for the booking form. They carry no validation authority.
#[derive(Debug, Clone, Serialize)]
pub struct InputConstraints {
    pub date_min: String,
    pub time_min: String,
    pub time_max: String,
    pub guests_min: i32,
    pub guests_max: i32,
    pub name_max_len: usize,
    pub phone_max_len: usize,
}

impl InputConstraints {
    pub fn new(rules: &BookingRules, today: NaiveDate) -> Self {
        Self {
            date_min: today.format("%Y-%m-%d").to_string(),
            time_min: rules.opening.format("%H:%M").to_string(),
            time_max: rules.closing.format("%H:%M").to_string(),
            guests_min: 1,
            guests_max: rules.capacity,
            name_max_len: NAME_MAX_LEN,
            phone_max_len: PHONE_MAX_LEN,
        }
    }
}

/// Parses every field, collecting all format errors before giving up.
pub fn clean_booking_form(data: &BookingFormData) -> Result<BookingProposal, FormErrors> {
    let mut errors = FormErrors::default();

    let name = data.name.trim();
    if name.is_empty() {
        errors.add("name", REQUIRED);
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.add("name", format!("Ensure this value has at most {} characters.", NAME_MAX_LEN));
    }

    let email = data.email.trim();
    if email.is_empty() {
        errors.add("email", REQUIRED);
    } else if !email.validate_email() {
        errors.add("email", "Enter a valid email address.");
    }

    let phone = data.phone.trim();
    if phone.is_empty() {
        errors.add("phone", REQUIRED);
    } else if phone.len() > PHONE_MAX_LEN || !PHONE_PATTERN.is_match(phone) {
        errors.add("phone", "Phone number must be entered in the format +999999999. Up to 15 digits allowed.");
    }

    let booking_date = parse_date(data.booking_date.trim(), &mut errors);
    let booking_time = parse_time(data.booking_time.trim(), &mut errors);
    let number_of_guests = parse_guests(data.number_of_guests.trim(), &mut errors);

    match (booking_date, booking_time, number_of_guests) {
        (Some(booking_date), Some(booking_time), Some(number_of_guests)) if errors.is_empty() => Ok(BookingProposal {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            booking_date,
            booking_time,
            number_of_guests,
        }),
        _ => Err(errors),
    }
}

fn parse_date(raw: &str, errors: &mut FormErrors) -> Option<NaiveDate> {
    if raw.is_empty() {
        errors.add("booking_date", REQUIRED);
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| errors.add("booking_date", "Enter a valid date."))
        .ok()
}

fn parse_time(raw: &str, errors: &mut FormErrors) -> Option<NaiveTime> {
    if raw.is_empty() {
        errors.add("booking_time", REQUIRED);
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| errors.add("booking_time", "Enter a valid time."))
        .ok()
}

fn parse_guests(raw: &str, errors: &mut FormErrors) -> Option<i32> {
    if raw.is_empty() {
        errors.add("number_of_guests", REQUIRED);
        return None;
    }
    match raw.parse::<i32>() {
        Ok(n) if n < 1 => {
            errors.add("number_of_guests", "Ensure this value is greater than or equal to 1.");
            None
        }
        Ok(n) => Some(n),
        Err(_) => {
            errors.add("number_of_guests", "Enter a whole number.");
            None
        }
    }
}
