use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::models::user::User;

/// The auth gate: resolves the request's bearer token to a `User`.
///
/// Declaring an `AuthedUser` parameter is what makes a route protected. The
/// extractor reads the `Authorization: Bearer <token>` header, verifies the
/// token's signature and expiry, and then requires that this exact token
/// string is still present in the user's session allowlist. A signature that
/// verifies but has been logged out is rejected just like a forged one.
///
/// Every failure mode collapses into the same generic 401; no caller can
/// tell a missing header from a revoked token.
#[derive(Debug)]
pub struct AuthedUser {
    /// The resolved user.
    pub user: User,
    /// The exact token string this request authenticated with. Logout needs
    /// it to revoke the presented session and no other.
    pub token: String,
}

impl FromRequest for AuthedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned)
                .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

            let claims = verify_token(&token)?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .ok_or_else(|| {
                    AppError::InternalServerError("database pool not configured".into())
                })?
                .clone();

            let user = User::find_by_id_and_token(&pool, claims.sub, &token)
                .await?
                .ok_or_else(|| AppError::Unauthorized("token not in allowlist".into()))?;

            Ok(AuthedUser { user, token })
        })
    }
}
