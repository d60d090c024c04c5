use crate::{
    auth::AuthedUser,
    error::AppError,
    models::{Task, TaskInput, TaskPatch, TaskQuery},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// Retrieves the authenticated user's tasks.
///
/// Ownership scoping is implicit and unconditional; filters only ever narrow
/// the caller's own tasks. Query parameters are parsed leniently: a
/// `completed` value other than "true"/"false", an unknown `sortBy` field, or
/// a non-numeric `limit`/`skip` are each treated as absent, never as errors.
///
/// ## Query Parameters:
/// - `completed` (optional): "true" or "false".
/// - `sortBy` (optional): `field:direction`, e.g. `createdAt:desc`. Any
///   direction other than the literal "desc" sorts ascending.
/// - `limit` / `skip` (optional): pagination.
#[get("")]
#[allow(unused_assignments)]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    let completed = query_params.completed_filter();
    if completed.is_some() {
        sql.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }

    // Sort column and direction come from a fixed whitelist, never from the
    // raw query string.
    if let Some((column, direction)) = query_params.order_clause() {
        sql.push_str(&format!(" ORDER BY {} {}", column, direction));
    }

    let limit = query_params.limit();
    if limit.is_some() {
        sql.push_str(&format!(" LIMIT ${}", param_count));
        param_count += 1;
    }

    let skip = query_params.skip();
    if skip.is_some() {
        sql.push_str(&format!(" OFFSET ${}", param_count));
    }

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(auth.user.id);
    if let Some(completed) = completed {
        query_builder = query_builder.bind(completed);
    }
    if let Some(limit) = limit {
        query_builder = query_builder.bind(limit);
    }
    if let Some(skip) = skip {
        query_builder = query_builder.bind(skip);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user. The owner comes from the
/// session, never from the payload.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let description = task_data.description.trim();
    if description.is_empty() {
        return Err(AppError::ValidationError("description is required".into()));
    }

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, description, completed, owner_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(description)
    .bind(task_data.completed.unwrap_or(false))
    .bind(auth.user.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Fetches a single task. The owner check is part of the lookup predicate
/// itself, so someone else's task is indistinguishable from a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(auth.user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates a task's description and/or completed flag.
///
/// The patch body may contain only those two keys; anything else rejects the
/// whole request with no partial application. The lookup carries the owner
/// predicate, so a non-owner's patch is a plain 404.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_uuid = task_id.into_inner();

    let existing = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_uuid)
    .bind(auth.user.id)
    .fetch_optional(&**pool)
    .await?;

    let existing = match existing {
        Some(task) => task,
        None => return Err(AppError::NotFound("Task not found".into())),
    };

    let description = match &task_data.description {
        Some(description) => {
            let trimmed = description.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError("description is required".into()));
            }
            trimmed
        }
        None => existing.description,
    };
    let completed = task_data.completed.unwrap_or(existing.completed);

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET description = $1, completed = $2, updated_at = now() \
         WHERE id = $3 AND owner_id = $4 \
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&description)
    .bind(completed)
    .bind(task_uuid)
    .bind(auth.user.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task and echoes it back. Owner predicate in the delete itself;
/// a non-owner sees 404 and the task is untouched.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    auth: AuthedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(auth.user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}
