use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, header},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::account::{
        AccountExport, AddressList, AddressRequest, ChangePasswordRequest, DeleteAccountRequest,
        DeleteAddressQuery, DeletionNotice, ProfileForm, ProfileView, ToggleSettingRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, Settings},
    response::ApiResponse,
    services::{account_service, address_service, settings_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            put(update_address).delete(delete_address),
        )
        .route("/addresses/{id}/default", put(set_default_address))
        .route("/settings", get(get_settings).patch(toggle_setting))
        .route("/password", post(change_password))
        .route("/export", get(export_data))
        .route("/delete", post(request_deletion))
}

#[utoipa::path(
    get,
    path = "/api/account/profile",
    responses(
        (status = 200, description = "Profile, or null with a default form when none is saved", body = ApiResponse<ProfileView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = account_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/account/profile",
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Profile saved and re-fetched", body = ApiResponse<ProfileView>),
        (status = 400, description = "Invalid pincode"),
        (status = 500, description = "Save failed, retry")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProfileForm>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = account_service::save_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/account/addresses",
    responses(
        (status = 200, description = "Saved addresses, default first", body = ApiResponse<AddressList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::list_addresses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/account/addresses",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address added", body = ApiResponse<Address>),
        (status = 400, description = "Missing or invalid field")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::create_address(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/account/addresses/{id}",
    request_body = AddressRequest,
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address replaced", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/account/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID"),
        ("confirm" = Option<bool>, Query, description = "Must be true")
    ),
    responses(
        (status = 200, description = "Address deleted", body = ApiResponse<AddressList>),
        (status = 400, description = "Confirmation required"),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteAddressQuery>,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::delete_address(&state, &user, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/account/addresses/{id}/default",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Default address updated", body = ApiResponse<AddressList>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::set_default_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/account/settings",
    responses(
        (status = 200, description = "Notification settings", body = ApiResponse<Settings>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = settings_service::get_settings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/account/settings",
    request_body = ToggleSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = ApiResponse<Settings>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn toggle_setting(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ToggleSettingRequest>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = settings_service::toggle_setting(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/account/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Passwords differ or are too short")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/account/export",
    responses(
        (status = 200, description = "Account data as a downloadable JSON file", body = AccountExport)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn export_data(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<([(HeaderName, HeaderValue); 1], Json<AccountExport>)> {
    let export = account_service::export_data(&state, &user).await?;
    let filename = account_service::export_filename(user.user_id);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(export)))
}

#[utoipa::path(
    post,
    path = "/api/account/delete",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Deletion request noted; nothing is deleted", body = ApiResponse<DeletionNotice>),
        (status = 400, description = "Confirmation text did not match")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn request_deletion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> AppResult<Json<ApiResponse<DeletionNotice>>> {
    let resp = account_service::request_account_deletion(&state, &user, payload).await?;
    Ok(Json(resp))
}
