use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// The caller behind a valid, unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    /// Token id, recorded on sign-out.
    pub jti: String,
}

pub fn bearer_token(value: &str) -> Result<&str, AppError> {
    if !value.starts_with("Bearer ") {
        return Err(AppError::Unauthorized);
    }
    Ok(value.trim_start_matches("Bearer ").trim())
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;
    Ok(decoded.claims)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = bearer_token(auth_str)?;
        let claims = decode_claims(token, &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized)?;

        let revoked: Option<(String,)> =
            sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = $1")
                .bind(claims.jti.as_str())
                .fetch_optional(&state.pool)
                .await?;
        if revoked.is_some() {
            tracing::debug!(%user_id, "rejected revoked token");
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            user_id,
            jti: claims.jti,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(matches!(
            bearer_token("Basic abc"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn claims_decode_with_matching_secret_only() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"bakery-secret"),
        )
        .unwrap();

        let decoded = decode_claims(&token, "bakery-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.jti, claims.jti);
        assert!(matches!(
            decode_claims(&token, "other-secret"),
            Err(AppError::Unauthorized)
        ));
    }
}
