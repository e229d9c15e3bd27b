use crate::domain::models::{
    booking::{Booking, BookingFilter, SlotReservation},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking only if the slot's non-cancelled guest total plus
    /// this party stays within `capacity`. Check and write are one atomic step.
    async fn create_within_capacity(&self, booking: &Booking, capacity: i32) -> Result<SlotReservation, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_slot(&self, date: NaiveDate, time: NaiveTime) -> Result<Vec<Booking>, AppError>;
    async fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
}
