use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use crate::state::AppState;
use crate::api::dtos::{requests::BookingFormData, responses::BookingView};
use crate::api::extractors::auth::AuthUser;
use crate::api::flash::{set_flash, take_flash, Flash};
use crate::api::forms::booking_form::{clean_booking_form, FormErrors, InputConstraints};
use crate::api::handlers::render;
use crate::domain::models::{auth::SessionUser, booking::{Booking, SlotReservation}};
use crate::domain::services::booking_rules::{check_booking, RuleViolation};
use crate::error::AppError;
use std::sync::Arc;
use tera::Context;
use tower_cookies::Cookies;
use tracing::{info, warn};

pub const MY_BOOKINGS_PATH: &str = "/booking/my-bookings";

pub async fn create_booking_page(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    render_booking_form(&state, &user, &BookingFormData::default(), &FormErrors::default())
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    cookies: Cookies,
    Form(form): Form<BookingFormData>,
) -> Result<Response, AppError> {
    if form.csrf_token != user.csrf_token {
        warn!("create_booking: CSRF token mismatch for user {}", user.id);
        return Err(AppError::Forbidden("CSRF token missing or incorrect".into()));
    }

    let proposal = match clean_booking_form(&form) {
        Ok(proposal) => proposal,
        Err(errors) => {
            info!("create_booking: form rejected with {} message(s)", errors.messages().len());
            return Ok(render_booking_form(&state, &user, &form, &errors)?.into_response());
        }
    };

    let rules = &state.config.rules;
    let today = state.config.today();

    let existing = state.booking_repo.list_by_slot(proposal.booking_date, proposal.booking_time).await?;

    if let Err(violation) = check_booking(rules, &proposal, today, &existing, None) {
        info!("create_booking: rejected {} {}: {}", proposal.booking_date, proposal.booking_time, violation);
        return reject(&state, &user, &form, violation);
    }

    let booking = Booking::new(user.id.clone(), proposal);

    match state.booking_repo.create_within_capacity(&booking, rules.capacity).await? {
        SlotReservation::Reserved(created) => {
            info!("Booking created: {} [{}] for user {}", created, created.id, user.id);
            set_flash(&cookies, Flash::BookingCreated);
            Ok(Redirect::to(MY_BOOKINGS_PATH).into_response())
        }
        SlotReservation::Full { booked } => {
            // Another request filled the slot between our read and the guarded insert.
            warn!("create_booking: slot {} {} filled concurrently ({} booked)", booking.booking_date, booking.booking_time, booked);
            let remaining = (i64::from(rules.capacity) - booked).max(0);
            reject(&state, &user, &form, RuleViolation::OverCapacity { remaining })
        }
    }
}

pub async fn booking_list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_user(&user.id).await?;
    let views: Vec<BookingView> = bookings.iter().map(BookingView::from).collect();

    let mut ctx = Context::new();
    ctx.insert("current_user", &user.username);
    ctx.insert("bookings", &views);
    ctx.insert("flash", &take_flash(&cookies).map(|f| f.message()));
    render(&state, "booking_list.html", &ctx)
}

fn reject(state: &AppState, user: &SessionUser, form: &BookingFormData, violation: RuleViolation) -> Result<Response, AppError> {
    let mut errors = FormErrors::default();
    match violation_field(&violation) {
        Some(field) => errors.add(field, violation.to_string()),
        None => errors.add_non_field(violation.to_string()),
    }
    Ok(render_booking_form(state, user, form, &errors)?.into_response())
}

/// Rule failures about a single input are shown next to that input.
fn violation_field(violation: &RuleViolation) -> Option<&'static str> {
    match violation {
        RuleViolation::PastDate | RuleViolation::ClosedDay { .. } => Some("booking_date"),
        RuleViolation::OutsideHours { .. } => Some("booking_time"),
        RuleViolation::OverCapacity { .. } => None,
    }
}

fn render_booking_form(state: &AppState, user: &SessionUser, form: &BookingFormData, errors: &FormErrors) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("current_user", &user.username);
    ctx.insert("csrf_token", &user.csrf_token);
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("constraints", &InputConstraints::new(&state.config.rules, state.config.today()));
    render(state, "create_booking.html", &ctx)
}
