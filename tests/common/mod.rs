use std::time::Duration;

use bakery_storefront_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool},
    state::AppState,
};

/// Build state against the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let config = AppConfig {
        database_url,
        jwt_secret: "test-secret".into(),
        host: "127.0.0.1".into(),
        port: 0,
        settings_save_delay: Duration::ZERO,
    };
    let orm = orm_from_pool(&pool);
    Ok(Some(AppState::new(pool, orm, config)))
}

/// Suffix keeping rows from separate runs apart without truncating shared tables.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
