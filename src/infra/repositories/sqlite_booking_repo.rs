use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, SlotReservation},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn booked_guests(&self, date: NaiveDate, time: NaiveTime) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(number_of_guests), 0) AS booked FROM bookings WHERE booking_date = ? AND booking_time = ? AND status != ?"
        )
            .bind(date).bind(time).bind(BookingStatus::Cancelled)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("booked"))
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_within_capacity(&self, booking: &Booking, capacity: i32) -> Result<SlotReservation, AppError> {
        // A single statement: SQLite holds the write lock while the subquery sums the slot.
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, name, email, phone, booking_date, booking_time, number_of_guests, status, created_on)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE (SELECT COALESCE(SUM(number_of_guests), 0) FROM bookings
                    WHERE booking_date = ? AND booking_time = ? AND status != ?) + ? <= ?
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.name).bind(&booking.email)
            .bind(&booking.phone).bind(booking.booking_date).bind(booking.booking_time)
            .bind(booking.number_of_guests).bind(booking.status).bind(booking.created_on)
            .bind(booking.booking_date).bind(booking.booking_time).bind(BookingStatus::Cancelled)
            .bind(booking.number_of_guests).bind(capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        match created {
            Some(b) => Ok(SlotReservation::Reserved(b)),
            None => Ok(SlotReservation::Full {
                booked: self.booked_guests(booking.booking_date, booking.booking_time).await?,
            }),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_id = ? ORDER BY booking_date ASC, booking_time ASC")
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_slot(&self, date: NaiveDate, time: NaiveTime) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_date = ? AND booking_time = ?")
            .bind(date).bind(time).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM bookings WHERE 1 = 1");
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
            // LIKE is case-insensitive for ASCII in SQLite.
            let pattern = format!("%{}%", term);
            qb.push(" AND (name LIKE ").push_bind(pattern.clone())
                .push(" OR email LIKE ").push_bind(pattern).push(")");
        }
        qb.push(" ORDER BY booking_date ASC, booking_time ASC");

        qb.build_query_as::<Booking>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
