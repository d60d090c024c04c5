use crate::{
    auth::{
        generate_token, hash_password, AuthResponse, AuthedUser, LoginRequest, RegisterRequest,
    },
    error::AppError,
    models::{Session, UpdateUser, User, UserView},
};
use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use futures::TryStreamExt;
use sqlx::PgPool;
use validator::Validate;

/// Uploads larger than this are rejected outright.
const MAX_AVATAR_BYTES: usize = 1_000_000;
const ALLOWED_AVATAR_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// Register a new user
///
/// Creates the account, hashes the password before anything is persisted,
/// and issues the first session token.
#[post("")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let name = register_data.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("name is required".into()));
    }

    if User::find_by_email(&pool, &register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;

    let user = User::insert(
        &pool,
        name,
        &register_data.email,
        register_data.age.unwrap_or(0),
        &password_hash,
    )
    .await?;

    let token = generate_token(user.id)?;
    Session::insert(&pool, user.id, &token).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserView::from(user),
        token,
    }))
}

/// Login
///
/// Checks credentials and issues a fresh session token. A wrong email and a
/// wrong password produce the same generic 400.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = User::find_by_credentials(&pool, &login_data.email, &login_data.password).await?;

    let token = generate_token(user.id)?;
    Session::insert(&pool, user.id, &token).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserView::from(user),
        token,
    }))
}

/// Revokes the session token this request authenticated with. Other sessions
/// for the same user stay live.
#[post("/logout")]
pub async fn logout(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
) -> Result<impl Responder, AppError> {
    Session::revoke(&pool, auth.user.id, &auth.token).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Clears the user's entire session allowlist.
#[post("/logoutAll")]
pub async fn logout_all(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
) -> Result<impl Responder, AppError> {
    Session::revoke_all(&pool, auth.user.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Returns the authenticated user's own profile, sanitized.
#[get("/me")]
pub async fn me(auth: AuthedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserView::from(auth.user)))
}

/// Updates the authenticated user's profile.
///
/// Allowed keys are name, email, age, and password; any other key rejects the
/// whole body at deserialization time. A new password goes through the same
/// validation and hashing as at signup, before anything reaches the database.
#[patch("/me")]
pub async fn update_me(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    patch: web::Json<UpdateUser>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let patch = patch.into_inner();
    let user = auth.user;

    if let Some(email) = &patch.email {
        if email != &user.email && User::find_by_email(&pool, email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
    }

    let name = match patch.name {
        Some(name) => {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError("name is required".into()));
            }
            trimmed
        }
        None => user.name,
    };
    let email = patch.email.unwrap_or(user.email);
    let age = patch.age.unwrap_or(user.age);
    let password_hash = match patch.password {
        Some(password) => hash_password(&password)?,
        None => user.password_hash,
    };

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET name = $1, email = $2, age = $3, password_hash = $4, updated_at = now() \
         WHERE id = $5 \
         RETURNING id, name, email, age, password_hash, created_at, updated_at",
    )
    .bind(&name)
    .bind(&email)
    .bind(age)
    .bind(&password_hash)
    .bind(user.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}

/// Deletes the account. Owned tasks and sessions are removed in the same
/// transaction as the user row; the sanitized user is echoed back.
#[delete("/me")]
pub async fn delete_me(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
) -> Result<impl Responder, AppError> {
    let view = UserView::from(auth.user.clone());
    User::delete_cascade(&pool, auth.user.id).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Accepts a multipart `avatar` field: PNG or JPEG, at most 1 MB. The bytes
/// are stored as uploaded together with their content type.
#[post("/me/avatar")]
pub async fn upload_avatar(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    mut payload: Multipart,
) -> Result<impl Responder, AppError> {
    let mut avatar: Option<(Vec<u8>, String)> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != "avatar" {
            // Drain unrelated fields so the multipart stream stays readable.
            while field
                .try_next()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
                .is_some()
            {}
            continue;
        }

        let mime = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_default();
        if !ALLOWED_AVATAR_TYPES.contains(&mime.as_str()) {
            return Err(AppError::BadRequest(
                "please upload a png or jpeg image".into(),
            ));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(AppError::BadRequest("image must be smaller than 1MB".into()));
            }
            bytes.extend_from_slice(&chunk);
        }

        avatar = Some((bytes, mime));
    }

    let (bytes, mime) = avatar.ok_or_else(|| {
        AppError::BadRequest("multipart field \"avatar\" is required".into())
    })?;

    sqlx::query("UPDATE users SET avatar = $1, avatar_mime = $2, updated_at = now() WHERE id = $3")
        .bind(&bytes)
        .bind(&mime)
        .bind(auth.user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().finish())
}

/// Clears the stored avatar, if any.
#[delete("/me/avatar")]
pub async fn delete_avatar(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
) -> Result<impl Responder, AppError> {
    sqlx::query("UPDATE users SET avatar = NULL, avatar_mime = NULL, updated_at = now() WHERE id = $1")
        .bind(auth.user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().finish())
}

/// Serves a user's avatar. Public: no authentication, by user id. 404 when
/// the user does not exist or has no avatar.
#[get("/{id}/avatar")]
pub async fn get_avatar(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let row: Option<(Option<Vec<u8>>, Option<String>)> =
        sqlx::query_as("SELECT avatar, avatar_mime FROM users WHERE id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(&**pool)
            .await?;

    match row {
        Some((Some(bytes), mime)) => Ok(HttpResponse::Ok()
            .content_type(mime.unwrap_or_else(|| "image/png".to_string()))
            .body(bytes)),
        _ => Err(AppError::NotFound("Avatar not found".into())),
    }
}
