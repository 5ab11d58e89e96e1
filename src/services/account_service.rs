use chrono::Utc;
use uuid::Uuid;

use crate::{
    account::{
        DELETE_CONFIRMATION,
        password::{hash_password, validate_new_password},
        profile::{non_empty, validate_pincode},
    },
    audit,
    db::DbPool,
    dto::account::{
        AccountExport, ChangePasswordRequest, DeleteAccountRequest, DeletionNotice, ProfileForm,
        ProfileView,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    services::{address_service, auth_service, settings_service},
    state::AppState,
};

pub const PROFILE_SAVED: &str = "Profile updated successfully!";
pub const PROFILE_SAVE_FAILED: &str = "Failed to update profile. Please try again.";
pub const PASSWORD_UPDATED: &str = "Password updated successfully!";
pub const DELETION_NOTICE: &str =
    "Account deletion is handled by our support team. Please contact support to complete the request.";

/// Single-row lookup. A user without a profile row is not an error.
pub async fn load_profile(pool: &DbPool, user_id: Uuid) -> AppResult<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

fn profile_view(profile: Option<UserProfile>) -> ProfileView {
    let form = profile.as_ref().map(ProfileForm::from).unwrap_or_default();
    ProfileView { profile, form }
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProfileView>> {
    let profile = load_profile(&state.pool, user.user_id).await?;
    let message = if profile.is_some() { "Profile" } else { "No profile yet" };
    Ok(ApiResponse::ok(message, profile_view(profile)))
}

async fn upsert_profile(pool: &DbPool, user_id: Uuid, form: &ProfileForm) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles
            (id, full_name, phone, street_address, landmark, area, city, pincode, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            phone = EXCLUDED.phone,
            street_address = EXCLUDED.street_address,
            landmark = EXCLUDED.landmark,
            area = EXCLUDED.area,
            city = EXCLUDED.city,
            pincode = EXCLUDED.pincode,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(user_id)
    .bind(non_empty(&form.full_name))
    .bind(non_empty(&form.phone))
    .bind(non_empty(&form.street_address))
    .bind(non_empty(&form.landmark))
    .bind(non_empty(&form.area))
    .bind(non_empty(&form.city))
    .bind(non_empty(&form.pincode))
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Upsert the whole profile, then re-read it whatever the outcome.
pub async fn save_profile(
    state: &AppState,
    user: &AuthUser,
    form: ProfileForm,
) -> AppResult<ApiResponse<ProfileView>> {
    validate_pincode(form.pincode.trim())?;

    let saved = upsert_profile(&state.pool, user.user_id, &form).await;
    let refreshed = load_profile(&state.pool, user.user_id).await;

    match saved {
        Ok(()) => {
            let profile = refreshed?;
            audit::record(
                &state.pool,
                user.user_id,
                "profile_update",
                "user_profiles",
                serde_json::json!({ "user_id": user.user_id }),
            )
            .await;
            Ok(ApiResponse::ok(PROFILE_SAVED, profile_view(profile)))
        }
        Err(err) => {
            tracing::error!(error = %err, user_id = %user.user_id, "error saving profile");
            if let Err(refetch_err) = refreshed {
                tracing::warn!(error = %refetch_err, "profile re-fetch after failed save also failed");
            }
            Err(AppError::Failed(PROFILE_SAVE_FAILED.into()))
        }
    }
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_new_password(&payload.new_password, &payload.confirm_password)?;
    let password_hash = hash_password(&payload.new_password)?;

    let result = sqlx::query(
        "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
    )
    .bind(user.user_id)
    .bind(password_hash)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "password_change",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::ok(PASSWORD_UPDATED, serde_json::json!({})))
}

/// Snapshot of everything the account holds. Read-only.
pub async fn export_data(state: &AppState, user: &AuthUser) -> AppResult<AccountExport> {
    let account = auth_service::find_user(state, user.user_id).await?;
    let profile = load_profile(&state.pool, user.user_id).await?;
    let addresses = address_service::load_addresses(&state.pool, user.user_id).await?;
    let settings = settings_service::load_settings(&state.pool, user.user_id).await?;

    tracing::info!(user_id = %user.user_id, addresses = addresses.len(), "account data exported");

    Ok(AccountExport {
        exported_at: Utc::now(),
        email: account.email,
        profile,
        addresses,
        settings,
    })
}

pub fn export_filename(user_id: Uuid) -> String {
    format!("bakery-account-{user_id}.json")
}

/// Accept a deletion request. Nothing is removed; the caller only gets a notice.
pub async fn request_account_deletion(
    state: &AppState,
    user: &AuthUser,
    payload: DeleteAccountRequest,
) -> AppResult<ApiResponse<DeletionNotice>> {
    if payload.confirmation != DELETE_CONFIRMATION {
        return Err(AppError::BadRequest(format!(
            "Type {DELETE_CONFIRMATION} to confirm"
        )));
    }

    tracing::info!(user_id = %user.user_id, "account deletion requested");
    audit::record(
        &state.pool,
        user.user_id,
        "account_deletion_request",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::ok(
        DELETION_NOTICE,
        DeletionNotice {
            requested_at: Utc::now(),
            deleted: false,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_is_named_after_the_user() {
        assert_eq!(
            export_filename(Uuid::nil()),
            "bakery-account-00000000-0000-0000-0000-000000000000.json"
        );
    }

    #[test]
    fn missing_profile_view_uses_default_form() {
        let view = profile_view(None);
        assert!(view.profile.is_none());
        assert_eq!(view.form, ProfileForm::default());
    }
}
