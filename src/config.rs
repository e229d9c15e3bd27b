use std::env;
use std::str::FromStr;
use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use crate::domain::services::booking_rules::BookingRules;
use crate::error::StartupError;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub session_ttl_minutes: i64,
    pub cookie_secure: bool,
    pub timezone: Tz,
    pub rules: BookingRules,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        let defaults = BookingRules::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 3000)?,
            jwt_secret_key: required("JWT_SECRET_KEY")?,
            jwt_public_key: required("JWT_PUBLIC_KEY")?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://table-booking.local".to_string()),
            session_ttl_minutes: parsed("SESSION_TTL_MINUTES", 720)?,
            cookie_secure: parsed("COOKIE_SECURE", true)?,
            timezone: parsed("RESTAURANT_TIMEZONE", Tz::UTC)?,
            rules: BookingRules {
                capacity: parsed("BOOKING_CAPACITY", defaults.capacity)?,
                opening: time_of_day("OPENING_TIME", defaults.opening)?,
                closing: time_of_day("CLOSING_TIME", defaults.closing)?,
                closed_day: parsed::<Weekday>("CLOSED_WEEKDAY", defaults.closed_day)?,
            },
            admin_username: env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }

    /// The current date at the restaurant.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

fn required(key: &str) -> Result<String, StartupError> {
    env::var(key).map_err(|_| StartupError::Config(format!("{key} must be set")))
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, StartupError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| StartupError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn time_of_day(key: &str, default: NaiveTime) -> Result<NaiveTime, StartupError> {
    match env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|_| StartupError::Config(format!("{key} must be HH:MM, got {raw}"))),
        Err(_) => Ok(default),
    }
}
