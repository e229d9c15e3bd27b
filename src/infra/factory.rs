use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::error::StartupError;
use crate::domain::models::user::{User, ROLE_ADMIN};
use crate::domain::ports::UserRepository;
use crate::domain::services::auth_service::AuthService;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, StartupError> {
    let database_url = &config.database_url;
    let templates = Arc::new(load_templates()?);
    let auth_service = Arc::new(AuthService::new(config)?);

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse()?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;

        AppState {
            config: config.clone(),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool)),
            auth_service,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;

        AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool)),
            auth_service,
            templates,
        }
    };

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        ensure_admin(state.user_repo.as_ref(), &state.auth_service, username, password).await?;
    }

    Ok(state)
}

/// Compiles the page templates embedded in the binary.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("index.html", include_str!("../../templates/index.html")),
        ("login.html", include_str!("../../templates/login.html")),
        ("register.html", include_str!("../../templates/register.html")),
        ("create_booking.html", include_str!("../../templates/create_booking.html")),
        ("booking_list.html", include_str!("../../templates/booking_list.html")),
    ])?;
    Ok(tera)
}

/// Creates the configured administrator unless that username already exists.
pub async fn ensure_admin(
    user_repo: &dyn UserRepository,
    auth_service: &AuthService,
    username: &str,
    password: &str,
) -> Result<(), StartupError> {
    if let Some(existing) = user_repo.find_by_username(username).await? {
        if !existing.is_admin() {
            warn!("Configured admin username {} belongs to a non-admin account", username);
        }
        return Ok(());
    }

    let mut admin = User::new(username.to_string(), auth_service.hash_password(password)?);
    admin.role = ROLE_ADMIN.to_string();
    user_repo.create(&admin).await?;

    info!("Admin account created: {}", admin.id);
    Ok(())
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/postgres").run(pool).await?;
    Ok(())
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/sqlite").run(pool).await?;
    Ok(())
}
