use serde_json::Value;
use uuid::Uuid;

use crate::{
    account::settings::settings_key,
    audit,
    db::DbPool,
    dto::account::ToggleSettingRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Settings,
    response::ApiResponse,
    state::AppState,
};

pub async fn load_settings(pool: &DbPool, user_id: Uuid) -> AppResult<Settings> {
    let stored: Option<(Value,)> = sqlx::query_as("SELECT value FROM settings_store WHERE key = $1")
        .bind(settings_key(user_id))
        .fetch_optional(pool)
        .await?;
    Ok(Settings::from_stored(stored.map(|(value,)| value)))
}

async fn store_settings(pool: &DbPool, user_id: Uuid, settings: &Settings) -> AppResult<()> {
    let value = settings
        .to_stored()
        .map_err(|e| AppError::Internal(e.into()))?;
    sqlx::query(
        r#"
        INSERT INTO settings_store (key, value, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(settings_key(user_id))
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_settings(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Settings>> {
    let settings = load_settings(&state.pool, user.user_id).await?;
    Ok(ApiResponse::ok("Settings", settings))
}

/// Flip one preference and write the whole object back under the user's key.
pub async fn toggle_setting(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleSettingRequest,
) -> AppResult<ApiResponse<Settings>> {
    let mut settings = load_settings(&state.pool, user.user_id).await?;
    settings.set(payload.setting, payload.enabled);
    store_settings(&state.pool, user.user_id, &settings).await?;

    let delay = state.config.settings_save_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    tracing::debug!(
        user_id = %user.user_id,
        setting = ?payload.setting,
        enabled = payload.enabled,
        "setting updated"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "settings_update",
        "settings_store",
        serde_json::json!({ "setting": payload.setting, "enabled": payload.enabled }),
    )
    .await;

    Ok(ApiResponse::ok("Settings updated", settings))
}
