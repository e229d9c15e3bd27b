use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use thiserror::Error;
use crate::domain::models::booking::{Booking, BookingProposal, BookingStatus};

/// Per-restaurant limits applied to every booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRules {
    /// Maximum sum of party sizes sharing one (date, time) slot.
    pub capacity: i32,
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub closed_day: Weekday,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            capacity: 20,
            opening: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            closing: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            closed_day: Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("You cannot book a table for a past date.")]
    PastDate,
    #[error("Bookings are only available during dinner hours, between {} and {}.", hhmm(.opening), hhmm(.closing))]
    OutsideHours { opening: NaiveTime, closing: NaiveTime },
    #[error("Sorry, we are closed on {}s.", weekday_name(.day))]
    ClosedDay { day: Weekday },
    #[error("Only {remaining} spots left for this time.")]
    OverCapacity { remaining: i64 },
}

/// Runs the rules in order and reports the first one that fails.
///
/// `existing` may hold bookings from any slot; only those matching the
/// proposal's date and time count against capacity. `editing` names a booking
/// being changed so its own party is not counted twice.
pub fn check_booking(
    rules: &BookingRules,
    proposal: &BookingProposal,
    today: NaiveDate,
    existing: &[Booking],
    editing: Option<&str>,
) -> Result<(), RuleViolation> {
    check_calendar(rules, proposal.booking_date, proposal.booking_time, today)?;

    let booked = booked_guests(existing, proposal.booking_date, proposal.booking_time, editing);
    check_capacity(rules, booked, proposal.number_of_guests)
}

/// Date and opening-hours rules, which need no stored data.
pub fn check_calendar(
    rules: &BookingRules,
    date: NaiveDate,
    time: NaiveTime,
    today: NaiveDate,
) -> Result<(), RuleViolation> {
    if date < today {
        return Err(RuleViolation::PastDate);
    }
    if time < rules.opening || time > rules.closing {
        return Err(RuleViolation::OutsideHours { opening: rules.opening, closing: rules.closing });
    }
    if date.weekday() == rules.closed_day {
        return Err(RuleViolation::ClosedDay { day: rules.closed_day });
    }
    Ok(())
}

pub fn check_capacity(rules: &BookingRules, booked: i64, guests: i32) -> Result<(), RuleViolation> {
    let capacity = i64::from(rules.capacity);
    if booked + i64::from(guests) > capacity {
        return Err(RuleViolation::OverCapacity { remaining: (capacity - booked).max(0) });
    }
    Ok(())
}

pub fn booked_guests(existing: &[Booking], date: NaiveDate, time: NaiveTime, editing: Option<&str>) -> i64 {
    existing
        .iter()
        .filter(|b| b.booking_date == date && b.booking_time == time)
        .filter(|b| b.status != BookingStatus::Cancelled)
        .filter(|b| editing != Some(b.id.as_str()))
        .map(|b| i64::from(b.number_of_guests))
        .sum()
}

fn hhmm(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn weekday_name(day: &Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
