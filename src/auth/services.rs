pub(crate) use crate::auth::dto::{Claims, JwtKeys, Role};
use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use rand::Rng;
use regex::Regex;
use sqlx::PgPool;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Synthetic phone number for accounts that do not carry a real one:
/// "1" followed by nine random digits, retried until unique.
pub async fn generate_unique_phone(db: &PgPool) -> anyhow::Result<String> {
    loop {
        let candidate = random_phone_candidate();
        if !User::phone_exists(db, &candidate).await? {
            return Ok(candidate);
        }
    }
}

pub(crate) fn random_phone_candidate() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("1{n:09}")
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            ttl_days,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: Duration::from_secs(ttl_days.max(0) as u64 * 24 * 60 * 60),
        }
    }
}

impl JwtKeys {
    /// Signs a token for the given subject. The role claim is included only
    /// for the non-default roles issued by the student/admin logins.
    pub fn sign(&self, user_id: Uuid, role: Option<Role>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, role = ?role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

pub(crate) fn ensure_admin(role: Role) -> Result<(), ApiError> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".into()))
    }
}

/// Extracts the bearer token, validates it, and loads the active user it
/// identifies. Malformed, expired, and tampered tokens all map to the same
/// 401 response.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".into()))?;

        Ok(CurrentUser(user))
    }
}

/// Like [`CurrentUser`] but rejects any non-admin account with 403. The role
/// check runs against the stored user record, so a valid token for a student
/// account never passes.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        ensure_admin(user.role)?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let password = "TopSecret99";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!hash.contains(password));
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_default_role_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, None).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, None);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[tokio::test]
    async fn sign_and_verify_role_bearing_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, Some(Role::Student)).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.role, Some(Role::Student));
    }

    #[tokio::test]
    async fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign(Uuid::new_v4(), None).expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn admin_guard_rejects_student_role() {
        let err = ensure_admin(Role::Student).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(ensure_admin(Role::Teacher).is_err());
        assert!(ensure_admin(Role::Admin).is_ok());
    }
}

#[cfg(test)]
mod phone_tests {
    use super::*;

    #[test]
    fn synthetic_phone_shape() {
        for _ in 0..32 {
            let phone = random_phone_candidate();
            assert_eq!(phone.len(), 10);
            assert!(phone.starts_with('1'));
            assert!(phone.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
