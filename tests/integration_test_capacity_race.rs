mod common;

use chrono::{NaiveTime, Weekday};
use common::{next_weekday, TestApp};
use table_booking::domain::models::booking::{Booking, BookingProposal, SlotReservation};
use table_booking::domain::models::user::User;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_never_exceed_capacity() {
    let app = TestApp::new().await;
    let monday = next_weekday(Weekday::Mon);
    let slot_time = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
    let capacity = app.state.config.rules.capacity;

    let owner = app.state.user_repo
        .create(&User::new("racer".to_string(), "unused".to_string()))
        .await
        .unwrap();

    let mut set = JoinSet::new();
    for i in 0..12 {
        let repo = app.state.booking_repo.clone();
        let booking = Booking::new(owner.id.clone(), BookingProposal {
            name: format!("Party {}", i),
            email: format!("party{}@example.com", i),
            phone: "+353861234567".to_string(),
            booking_date: monday,
            booking_time: slot_time,
            number_of_guests: 3,
        });
        set.spawn(async move { repo.create_within_capacity(&booking, capacity).await });
    }

    let mut reserved = 0;
    let mut full = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap().unwrap() {
            SlotReservation::Reserved(_) => reserved += 1,
            SlotReservation::Full { booked } => {
                assert!(booked + 3 > i64::from(capacity));
                full += 1;
            }
        }
    }

    // 20 seats fit six parties of three.
    assert_eq!(reserved, 6);
    assert_eq!(full, 6);

    let stored = app.state.booking_repo.list_by_slot(monday, slot_time).await.unwrap();
    let total: i32 = stored.iter().map(|b| b.number_of_guests).sum();
    assert!(total <= capacity);
    assert_eq!(total, 18);
}

#[tokio::test]
async fn test_cancelled_bookings_free_their_seats() {
    let app = TestApp::new().await;
    let monday = next_weekday(Weekday::Mon);
    let alice = app.register("alice").await;

    let cancelled = app.seed_booking("bob", monday, "19:00", 20).await;
    sqlx::query("UPDATE bookings SET status = 2 WHERE id = ?")
        .bind(&cancelled.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.book(&alice, monday, "19:00", 20).await;
    assert_eq!(res.status(), axum::http::StatusCode::SEE_OTHER);
}
