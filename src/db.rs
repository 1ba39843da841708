use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::repo::{NewUser, User};
use crate::auth::services::{generate_unique_phone, hash_password};
use crate::auth::Role;
use crate::config::AppConfig;
use crate::state::AppState;

const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

pub fn connect_pool(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(&config.database_url)?;
    Ok(db)
}

/// Pings the store until it answers, retrying forever with a fixed backoff,
/// then runs migrations and seeds the default admin. The process keeps
/// serving HTTP the whole time; store-backed routes fail transiently until
/// connectivity is established.
pub async fn run_until_connected(state: AppState) {
    let mut attempt: u64 = 0;
    loop {
        match sqlx::query("SELECT 1").execute(&state.db).await {
            Ok(_) => {
                info!("database connection established");
                break;
            }
            Err(e) => {
                attempt += 1;
                warn!(error = %e, attempt, "database unreachable; retrying");
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    }

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        warn!(error = %e, "migration failed; continuing");
    }

    if let Err(e) = seed_admin(&state).await {
        warn!(error = %e, "admin seeding failed");
    }
}

/// Ensures one admin account exists, creating it from the configured
/// credentials when missing.
pub async fn seed_admin(state: &AppState) -> anyhow::Result<()> {
    if let Some(admin) = User::find_any_admin(&state.db).await? {
        info!(admin_id = %admin.id, email = %admin.email, "admin already exists");
        return Ok(());
    }

    let phone_number = generate_unique_phone(&state.db).await?;
    let password_hash = hash_password(&state.config.admin_password)?;
    let admin = User::create(
        &state.db,
        NewUser {
            name: "Admin".into(),
            phone_number,
            email: state.config.admin_email.clone(),
            password_hash,
            role: Role::Admin,
            masjid_info: None,
            student_info: None,
        },
    )
    .await?;

    info!(admin_id = %admin.id, email = %admin.email, "default admin created");
    Ok(())
}
