#![allow(dead_code)]

use table_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::{ensure_admin, load_templates},
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    domain::models::booking::{Booking, BookingProposal, SlotReservation},
    domain::models::user::User,
    domain::services::{auth_service::AuthService, booking_rules::BookingRules},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, Response, header},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use std::str::FromStr;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct Session {
    pub access_token: String,
    pub csrf_token: String,
}

impl Session {
    pub fn cookie_header(&self) -> String {
        format!("access_token={}; csrftoken={}", self.access_token, self.csrf_token)
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_rules(BookingRules::default()).await
    }

    pub async fn with_rules(rules: BookingRules) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(StdDuration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            session_ttl_minutes: 60,
            cookie_secure: false,
            timezone: chrono_tz::UTC,
            rules,
            admin_username: None,
            admin_password: None,
        };

        let state = Arc::new(AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            auth_service: Arc::new(AuthService::new(&config).expect("test keys must load")),
            templates: Arc::new(load_templates().expect("templates must compile")),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, session: Option<&Session>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(s) = session {
            builder = builder.header(header::COOKIE, s.cookie_header());
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<String>, fields: &[(&str, &str)]) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::from(form_body(fields))).unwrap()).await
    }

    pub async fn register(&self, username: &str) -> Session {
        let response = self.post_form("/accounts/register", None, &[
            ("username", username),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ]).await;

        if !response.status().is_redirection() {
            panic!("Registration failed in test helper: status {}", response.status());
        }
        session_from(&response)
    }

    pub async fn login(&self, username: &str, password: &str) -> Session {
        let response = self.post_form("/accounts/login", None, &[
            ("username", username),
            ("password", password),
        ]).await;

        if !response.status().is_redirection() {
            panic!("Login failed in test helper: status {}", response.status());
        }
        session_from(&response)
    }

    pub async fn login_admin(&self, username: &str) -> Session {
        ensure_admin(self.state.user_repo.as_ref(), &self.state.auth_service, username, PASSWORD)
            .await
            .expect("admin bootstrap");
        self.login(username, PASSWORD).await
    }

    /// Submits the booking form with the session's CSRF token.
    pub async fn book(&self, session: &Session, date: NaiveDate, time: &str, guests: i32) -> Response<Body> {
        let date = date.format("%Y-%m-%d").to_string();
        let guests = guests.to_string();
        self.post_form("/booking/create", Some(session.cookie_header()), &[
            ("name", "Test Diner"),
            ("email", "diner@example.com"),
            ("phone", "+353861234567"),
            ("booking_date", &date),
            ("booking_time", time),
            ("number_of_guests", &guests),
            ("csrf_token", &session.csrf_token),
        ]).await
    }

    /// Inserts a booking straight into the store, bypassing the rules.
    pub async fn seed_booking(&self, owner: &str, date: NaiveDate, time: &str, guests: i32) -> Booking {
        let user_id = match self.state.user_repo.find_by_username(owner).await.unwrap() {
            Some(u) => u.id,
            None => self.state.user_repo.create(&User::new(owner.to_string(), "unused".to_string())).await.unwrap().id,
        };

        let booking = Booking::new(user_id, BookingProposal {
            name: format!("{} party", owner),
            email: format!("{}@example.com", owner),
            phone: "123456789".to_string(),
            booking_date: date,
            booking_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            number_of_guests: guests,
        });

        match self.state.booking_repo.create_within_capacity(&booking, i32::MAX).await.unwrap() {
            SlotReservation::Reserved(b) => b,
            SlotReservation::Full { .. } => panic!("seeding must not hit capacity"),
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).expect("form fields must encode")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect()
}

pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).iter()
        .find(|c| c.starts_with(&prefix))
        .map(|c| c[prefix.len()..].split(';').next().unwrap_or_default().to_string())
}

pub fn session_from(response: &Response<Body>) -> Session {
    Session {
        access_token: cookie_value(response, "access_token").expect("No access_token cookie returned"),
        csrf_token: cookie_value(response, "csrftoken").expect("No csrftoken cookie returned"),
    }
}

pub fn location(response: &Response<Body>) -> String {
    response.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The first date strictly after today that falls on `weekday`.
pub fn next_weekday(weekday: Weekday) -> NaiveDate {
    let mut date = today() + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}
