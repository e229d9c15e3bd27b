use axum::{extract::{Query, State}, response::IntoResponse, Json};
use chrono::{NaiveDate, NaiveTime};
use crate::state::AppState;
use crate::api::dtos::requests::AdminBookingQuery;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{booking::{BookingFilter, BookingStatus}, user::ROLE_ADMIN};
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<AdminBookingQuery>,
) -> Result<impl IntoResponse, AppError> {
    if user.role != ROLE_ADMIN {
        warn!("Non-admin {} tried to list all bookings", user.id);
        return Err(AppError::Forbidden("Administrator access required".into()));
    }

    let filter = parse_filter(query)?;
    let bookings = state.booking_repo.search(&filter).await?;

    info!("Admin {} listed {} bookings", user.id, bookings.len());
    Ok(Json(bookings))
}

fn parse_filter(query: AdminBookingQuery) -> Result<BookingFilter, AppError> {
    let status = match non_empty(query.status) {
        None => None,
        Some(raw) => Some(match raw.to_ascii_lowercase().as_str() {
            "pending" | "0" => BookingStatus::Pending,
            "confirmed" | "1" => BookingStatus::Confirmed,
            "cancelled" | "2" => BookingStatus::Cancelled,
            _ => return Err(AppError::Validation(format!("Unknown status: {}", raw))),
        }),
    };

    let date = non_empty(query.date)
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let time = non_empty(query.time)
        .map(|t| NaiveTime::parse_from_str(&t, "%H:%M").or_else(|_| NaiveTime::parse_from_str(&t, "%H:%M:%S")))
        .transpose()
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    Ok(BookingFilter { status, date, time, search: non_empty(query.q) })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
