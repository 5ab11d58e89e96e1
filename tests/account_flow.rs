mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use bakery_storefront_api::{
    dto::{
        account::{
            AddressRequest, ChangePasswordRequest, DeleteAccountRequest, DeleteAddressQuery,
            ProfileForm, ToggleSettingRequest,
        },
        auth::{LoginRequest, LogoutRequest, RegisterRequest},
    },
    account::settings::SettingName,
    error::AppError,
    middleware::auth::AuthUser,
    models::AddressType,
    services::{
        account_service::{self, PROFILE_SAVE_FAILED},
        address_service, auth_service, settings_service,
    },
    state::AppState,
};
use uuid::Uuid;

async fn register(state: &AppState, password: &str) -> anyhow::Result<(String, AuthUser)> {
    let email = format!("{}@example.com", common::unique("customer"));
    let user = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.clone(),
            password: password.into(),
        },
    )
    .await?
    .data
    .expect("registered user");

    let auth = AuthUser {
        user_id: user.id,
        jti: Uuid::new_v4().to_string(),
    };
    Ok((email, auth))
}

fn address(address_type: AddressType, street: &str, is_default: bool) -> AddressRequest {
    AddressRequest {
        address_type,
        label: None,
        street_address: street.into(),
        landmark: Some("Near the metro".into()),
        area: "Indiranagar".into(),
        city: None,
        pincode: "560038".into(),
        is_default,
    }
}

async fn can_login(state: &AppState, email: &str, password: &str) -> bool {
    auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: password.into(),
        },
    )
    .await
    .is_ok()
}

// Profile: missing row is not an error; save upserts then re-reads; bad pincode never writes.
#[tokio::test]
async fn profile_fetch_and_save() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, user) = register(&state, "bakery123").await?;

    let view = account_service::get_profile(&state, &user).await?.data.unwrap();
    assert!(view.profile.is_none());
    assert_eq!(view.form.city, "Bangalore");

    let form = ProfileForm {
        full_name: "Asha Rao".into(),
        phone: "9876543210".into(),
        pincode: "560041".into(),
        ..ProfileForm::default()
    };
    let saved = account_service::save_profile(&state, &user, form).await?;
    assert_eq!(saved.message, "Profile updated successfully!");
    let profile = saved.data.unwrap().profile.expect("profile after save");
    assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
    assert_eq!(profile.city.as_deref(), Some("Bangalore"));
    assert_eq!(profile.landmark, None);

    let bad = ProfileForm {
        full_name: "Someone Else".into(),
        pincode: "12ab".into(),
        ..ProfileForm::default()
    };
    let err = account_service::save_profile(&state, &user, bad).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let view = account_service::get_profile(&state, &user).await?.data.unwrap();
    assert_eq!(view.form.full_name, "Asha Rao");
    Ok(())
}

// Address book: one default at a time, confirmation on delete, promotion after deleting the default.
#[tokio::test]
async fn address_book_keeps_a_single_default() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, user) = register(&state, "bakery123").await?;

    let home = address_service::create_address(&state, &user, address(AddressType::Home, "12 MG Road", false))
        .await?
        .data
        .unwrap();
    assert!(home.is_default, "first address becomes default");
    assert_eq!(home.label, "Home");

    let work = address_service::create_address(&state, &user, address(AddressType::Work, "1 Tech Park", true))
        .await?
        .data
        .unwrap();
    assert!(work.is_default);

    let list = address_service::list_addresses(&state, &user).await?.data.unwrap();
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items.iter().filter(|a| a.is_default).count(), 1);
    assert_eq!(list.items[0].id, work.id);

    let list = address_service::set_default_address(&state, &user, home.id)
        .await?
        .data
        .unwrap();
    assert_eq!(list.items.iter().filter(|a| a.is_default).count(), 1);
    assert!(list.items.iter().any(|a| a.id == home.id && a.is_default));

    let mut edited = address(AddressType::Other, "14 MG Road", true);
    edited.label = Some("Parents".into());
    let updated = address_service::update_address(&state, &user, work.id, edited)
        .await?
        .data
        .unwrap();
    assert_eq!(updated.label, "Parents");
    assert_eq!(updated.created_at, work.created_at);

    let err = address_service::delete_address(&state, &user, updated.id, DeleteAddressQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let list = address_service::delete_address(
        &state,
        &user,
        updated.id,
        DeleteAddressQuery { confirm: Some(true) },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].id, home.id);
    assert!(list.items[0].is_default, "remaining address is promoted");

    let missing = address_service::set_default_address(&state, &user, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn settings_toggle_is_persisted() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, user) = register(&state, "bakery123").await?;

    let initial = settings_service::get_settings(&state, &user).await?.data.unwrap();
    assert!(!initial.marketing_communications);

    let returned = settings_service::toggle_setting(
        &state,
        &user,
        ToggleSettingRequest {
            setting: SettingName::MarketingCommunications,
            enabled: true,
        },
    )
    .await?
    .data
    .unwrap();
    let stored = settings_service::load_settings(&state.pool, user.user_id).await?;
    assert!(returned.marketing_communications);
    assert_eq!(returned, stored);
    assert!(stored.email_notifications);
    Ok(())
}

// A mismatched confirmation never reaches the password update.
#[tokio::test]
async fn password_change_validates_before_updating() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (email, user) = register(&state, "bakery123").await?;

    let err = account_service::change_password(
        &state,
        &user,
        ChangePasswordRequest {
            new_password: "newpassword".into(),
            confirm_password: "newpasswrod".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(can_login(&state, &email, "bakery123").await);

    let ok = account_service::change_password(
        &state,
        &user,
        ChangePasswordRequest {
            new_password: "newpassword".into(),
            confirm_password: "newpassword".into(),
        },
    )
    .await?;
    assert_eq!(ok.message, "Password updated successfully!");
    assert!(can_login(&state, &email, "newpassword").await);
    assert!(!can_login(&state, &email, "bakery123").await);
    Ok(())
}

#[tokio::test]
async fn export_deletion_request_and_sign_out() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (email, user) = register(&state, "bakery123").await?;
    address_service::create_address(&state, &user, address(AddressType::Home, "3 Church Street", false))
        .await?;

    let export = account_service::export_data(&state, &user).await?;
    assert_eq!(export.email, email);
    assert_eq!(export.addresses.len(), 1);
    assert!(export.profile.is_none());

    let err = account_service::request_account_deletion(
        &state,
        &user,
        DeleteAccountRequest {
            confirmation: "delete".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let notice = account_service::request_account_deletion(
        &state,
        &user,
        DeleteAccountRequest {
            confirmation: "DELETE".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!notice.deleted);
    assert!(auth_service::find_user(&state, user.user_id).await.is_ok());

    let err = auth_service::sign_out(&state, &user, LogoutRequest { confirm: false })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::sign_out(&state, &user, LogoutRequest { confirm: true }).await?;
    let revoked: Option<(String,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = $1")
        .bind(user.jti.as_str())
        .fetch_optional(&state.pool)
        .await?;
    assert!(revoked.is_some());
    Ok(())
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let (mut parts, ()) = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, token)
        .body(())
        .expect("request")
        .into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}

// Two first-address creates racing for the same user must both succeed with one default.
#[tokio::test]
async fn concurrent_first_addresses_keep_one_default() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    for _ in 0..10 {
        let (_, user) = register(&state, "bakery123").await?;
        let (first, second) = tokio::join!(
            address_service::create_address(
                &state,
                &user,
                address(AddressType::Home, "12 MG Road", false)
            ),
            address_service::create_address(
                &state,
                &user,
                address(AddressType::Work, "1 Tech Park", false)
            ),
        );
        first?;
        second?;

        let list = address_service::list_addresses(&state, &user).await?.data.unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items.iter().filter(|a| a.is_default).count(), 1);
    }
    Ok(())
}

// A token stops authenticating once its holder signs out.
#[tokio::test]
async fn signed_out_token_is_rejected() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (email, _) = register(&state, "bakery123").await?;

    let token = auth_service::login_user(
        &state,
        LoginRequest {
            email,
            password: "bakery123".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .token;

    let user = authenticate(&state, &token).await?;
    auth_service::current_user(&state, &user).await?;

    auth_service::sign_out(&state, &user, LogoutRequest { confirm: true }).await?;

    let err = authenticate(&state, &token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);

    let missing = authenticate(&state, "Basic abc").await.unwrap_err();
    assert!(matches!(missing, AppError::Unauthorized));
    Ok(())
}

// When the upsert itself fails the caller gets the retry message and no row is written.
#[tokio::test]
async fn failed_profile_save_reports_and_writes_nothing() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, user) = register(&state, "bakery123").await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    let form = ProfileForm {
        full_name: "Asha Rao".into(),
        pincode: "560041".into(),
        ..ProfileForm::default()
    };
    let err = account_service::save_profile(&state, &user, form)
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::Failed(msg) if msg == PROFILE_SAVE_FAILED));

    let profile = account_service::load_profile(&state.pool, user.user_id).await?;
    assert!(profile.is_none());
    Ok(())
}
