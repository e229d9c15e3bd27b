use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, SlotReservation},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_within_capacity(&self, booking: &Booking, capacity: i32) -> Result<SlotReservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serializes writers per slot until commit; READ COMMITTED alone would let two sums race.
        let slot_key = format!("{} {}", booking.booking_date, booking.booking_time);
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&slot_key).execute(&mut *tx).await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, name, email, phone, booking_date, booking_time, number_of_guests, status, created_on)
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
             WHERE (SELECT COALESCE(SUM(number_of_guests), 0) FROM bookings
                    WHERE booking_date = $6 AND booking_time = $7 AND status != $11) + $8 <= $12
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.name).bind(&booking.email)
            .bind(&booking.phone).bind(booking.booking_date).bind(booking.booking_time)
            .bind(booking.number_of_guests).bind(booking.status).bind(booking.created_on)
            .bind(BookingStatus::Cancelled).bind(capacity)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let outcome = match created {
            Some(b) => SlotReservation::Reserved(b),
            None => {
                let row = sqlx::query(
                    "SELECT COALESCE(SUM(number_of_guests), 0)::BIGINT AS booked FROM bookings WHERE booking_date = $1 AND booking_time = $2 AND status != $3"
                )
                    .bind(booking.booking_date).bind(booking.booking_time).bind(BookingStatus::Cancelled)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
                SlotReservation::Full { booked: row.get::<i64, _>("booked") }
            }
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(outcome)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_id = $1 ORDER BY booking_date ASC, booking_time ASC")
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_slot(&self, date: NaiveDate, time: NaiveTime) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_date = $1 AND booking_time = $2")
            .bind(date).bind(time).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookings WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(date) = filter.date {
            qb.push(" AND booking_date = ").push_bind(date);
        }
        if let Some(time) = filter.time {
            qb.push(" AND booking_time = ").push_bind(time);
        }
        if let Some(term) = &filter.search {
            let pattern = format!("%{}%", term);
            qb.push(" AND (name ILIKE ").push_bind(pattern.clone())
                .push(" OR email ILIKE ").push_bind(pattern).push(")");
        }
        qb.push(" ORDER BY booking_date ASC, booking_time ASC");

        qb.build_query_as::<Booking>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
