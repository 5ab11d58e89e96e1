use chrono::{SubsecRound, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    account::{
        address_book::{AddressBook, AddressChanges},
        profile::{DEFAULT_CITY, non_empty, validate_pincode},
    },
    audit,
    db::DbPool,
    dto::account::{AddressList, AddressRequest, DeleteAddressQuery},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

const SELECT_ADDRESSES: &str = r#"
    SELECT * FROM addresses
    WHERE user_id = $1
    ORDER BY is_default DESC, created_at ASC
"#;

pub async fn load_addresses(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<Address>> {
    let items = sqlx::query_as::<_, Address>(SELECT_ADDRESSES)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Lock the owning user row, then read the book. The user row exists even
/// when the book is empty, so concurrent first inserts queue behind it.
async fn lock_addresses(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> AppResult<Vec<Address>> {
    let owner: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    if owner.is_none() {
        return Err(AppError::NotFound);
    }

    let items = sqlx::query_as::<_, Address>(
        "SELECT * FROM addresses WHERE user_id = $1 ORDER BY created_at FOR UPDATE",
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(items)
}

async fn write_changes(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    changes: &AddressChanges,
) -> AppResult<()> {
    for id in &changes.removed {
        sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
    }

    for address in &changes.updated {
        sqlx::query(
            r#"
            UPDATE addresses
            SET type = $3, label = $4, street_address = $5, landmark = $6,
                area = $7, city = $8, pincode = $9, is_default = $10, updated_at = $11
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(address.id)
        .bind(user_id)
        .bind(address.address_type.as_str())
        .bind(address.label.as_str())
        .bind(address.street_address.as_str())
        .bind(address.landmark.as_deref())
        .bind(address.area.as_str())
        .bind(address.city.as_str())
        .bind(address.pincode.as_str())
        .bind(address.is_default)
        .bind(address.updated_at)
        .execute(&mut **tx)
        .await?;
    }

    for address in &changes.inserted {
        sqlx::query(
            r#"
            INSERT INTO addresses
                (id, user_id, type, label, street_address, landmark, area, city, pincode,
                 is_default, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(address.id)
        .bind(user_id)
        .bind(address.address_type.as_str())
        .bind(address.label.as_str())
        .bind(address.street_address.as_str())
        .bind(address.landmark.as_deref())
        .bind(address.area.as_str())
        .bind(address.city.as_str())
        .bind(address.pincode.as_str())
        .bind(address.is_default)
        .bind(address.created_at)
        .bind(address.updated_at)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Load the user's book under a row lock, apply `op`, persist the difference.
async fn mutate_book<T, F>(state: &AppState, user_id: Uuid, op: F) -> AppResult<(T, AddressBook)>
where
    F: FnOnce(&mut AddressBook) -> AppResult<T>,
{
    let mut tx = state.pool.begin().await?;
    let before = lock_addresses(&mut tx, user_id).await?;
    let mut book = AddressBook::new(before.clone());

    let outcome = op(&mut book)?;

    let changes = book.changes_since(&before);
    if !changes.is_empty() {
        write_changes(&mut tx, user_id, &changes).await?;
    }
    tx.commit().await?;

    tracing::debug!(
        %user_id,
        removed = changes.removed.len(),
        updated = changes.updated.len(),
        inserted = changes.inserted.len(),
        "address book saved"
    );
    Ok((outcome, book))
}

/// Turn a request into a full address row, filling defaults.
pub fn address_from_request(
    id: Uuid,
    user_id: Uuid,
    payload: AddressRequest,
) -> AppResult<Address> {
    let street_address = non_empty(&payload.street_address)
        .ok_or_else(|| AppError::BadRequest("street_address is required".into()))?;
    let area = non_empty(&payload.area)
        .ok_or_else(|| AppError::BadRequest("area is required".into()))?;
    let pincode = payload.pincode.trim().to_string();
    if pincode.is_empty() {
        return Err(AppError::BadRequest("pincode is required".into()));
    }
    validate_pincode(&pincode)?;

    let label = payload
        .label
        .as_deref()
        .and_then(non_empty)
        .unwrap_or_else(|| payload.address_type.default_label().to_string());
    let city = payload
        .city
        .as_deref()
        .and_then(non_empty)
        .unwrap_or_else(|| DEFAULT_CITY.to_string());

    // Postgres keeps microseconds.
    let now = Utc::now().trunc_subsecs(6);
    Ok(Address {
        id,
        user_id,
        address_type: payload.address_type,
        label,
        street_address,
        landmark: payload.landmark.as_deref().and_then(non_empty),
        area,
        city,
        pincode,
        is_default: payload.is_default,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = load_addresses(&state.pool, user.user_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Addresses", AddressList { items }, Some(meta)))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let address = address_from_request(Uuid::new_v4(), user.user_id, payload)?;
    let id = address.id;

    let ((), book) = mutate_book(state, user.user_id, |book| {
        book.add(address);
        Ok(())
    })
    .await?;

    let created = book.get(id).cloned().ok_or(AppError::NotFound)?;
    audit::record(
        &state.pool,
        user.user_id,
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": id, "is_default": created.is_default }),
    )
    .await;

    Ok(ApiResponse::ok("Address added", created))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let address = address_from_request(id, user.user_id, payload)?;

    let ((), book) = mutate_book(state, user.user_id, |book| {
        if book.replace(address) {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    })
    .await?;

    let updated = book.get(id).cloned().ok_or(AppError::NotFound)?;
    audit::record(
        &state.pool,
        user.user_id,
        "address_update",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Address updated", updated))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    query: DeleteAddressQuery,
) -> AppResult<ApiResponse<AddressList>> {
    if query.confirm != Some(true) {
        return Err(AppError::BadRequest("Confirmation required".into()));
    }

    let (removed, book) = mutate_book(state, user.user_id, |book| {
        book.remove(id).ok_or(AppError::NotFound)
    })
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_delete",
        "addresses",
        serde_json::json!({ "address_id": removed.id, "was_default": removed.is_default }),
    )
    .await;

    let meta = Meta::total(book.len());
    Ok(ApiResponse::success(
        "Address deleted",
        AddressList {
            items: book.into_entries(),
        },
        Some(meta),
    ))
}

pub async fn set_default_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AddressList>> {
    let ((), book) = mutate_book(state, user.user_id, |book| {
        if book.set_default(id) {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    })
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_set_default",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    let meta = Meta::total(book.len());
    Ok(ApiResponse::success(
        "Default address updated",
        AddressList {
            items: book.into_entries(),
        },
        Some(meta),
    ))
}
