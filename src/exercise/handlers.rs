use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::exercise::dto::{
    AddExerciseRequest, AddExerciseResponse, LogEntryView, LogQuery, LogResponse, NewUserRequest,
    PublicUser,
};
use crate::exercise::repo_types::{LogEntry, User};
use crate::exercise::services;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/log", get(get_log))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/new-user", post(new_user))
        .route("/add", post(add_exercise))
}

#[instrument(skip(state, payload))]
pub async fn new_user(
    State(state): State<AppState>,
    Json(mut payload): Json<NewUserRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    if !services::is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }

    // Ensure the username is not taken
    match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(_)) => {
            warn!(username = %payload.username, "username already taken");
            return Err((
                StatusCode::CONFLICT,
                format!("username already taken: {}", payload.username),
            ));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let id = services::generate_user_id();
    let user = match User::create(&state.db, &id, &payload.username).await {
        Ok(u) => u,
        // A racing create on the same username lands on the UNIQUE constraint
        Err(e) if is_unique_violation(&e) => {
            warn!(username = %payload.username, "username already taken");
            return Err((
                StatusCode::CONFLICT,
                format!("username already taken: {}", payload.username),
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

#[instrument(skip(state, payload))]
pub async fn add_exercise(
    State(state): State<AppState>,
    Json(payload): Json<AddExerciseRequest>,
) -> Result<Json<AddExerciseResponse>, (StatusCode, String)> {
    if payload.description.trim().is_empty() {
        warn!(user_id = %payload.user_id, "empty description");
        return Err((StatusCode::BAD_REQUEST, "Description is required".into()));
    }

    let exercise_date =
        services::resolve_exercise_date(payload.date.as_deref(), OffsetDateTime::now_utc())
            .map_err(|e| {
                warn!(user_id = %payload.user_id, error = %e, "bad date");
                (StatusCode::BAD_REQUEST, e.to_string())
            })?;

    let entry = LogEntry {
        description: payload.description,
        duration: payload.duration,
        exercise_date,
    };

    let user = match User::append_log(&state.db, &payload.user_id, &entry).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id = %payload.user_id, "unknown userId");
            return Err((StatusCode::NOT_FOUND, "unknown userId".into()));
        }
        Err(e) => {
            error!(error = %e, user_id = %payload.user_id, "append_log failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(user_id = %user.id, duration = entry.duration, "exercise added");
    Ok(Json(AddExerciseResponse {
        id: user.id,
        username: user.username,
        description: entry.description,
        duration: entry.duration,
        date: services::format_date(entry.exercise_date),
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, (StatusCode, String)> {
    let users = User::list(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let items = users
        .into_iter()
        .map(|u| PublicUser {
            id: u.id,
            username: u.username,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    Query(q): Query<LogQuery>,
) -> Result<Json<LogResponse>, (StatusCode, String)> {
    let from = parse_bound(q.from.as_deref()).map_err(|e| {
        warn!(user_id = %q.user_id, error = %e, "bad from");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    let to = parse_bound(q.to.as_deref()).map_err(|e| {
        warn!(user_id = %q.user_id, error = %e, "bad to");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    if q.limit == Some(0) {
        warn!(user_id = %q.user_id, "zero limit");
        return Err((
            StatusCode::BAD_REQUEST,
            "limit must be a positive integer".into(),
        ));
    }

    let user = match User::find_by_id(&state.db, &q.user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id = %q.user_id, "unknown userId");
            return Err((StatusCode::NOT_FOUND, "unknown userId".into()));
        }
        Err(e) => {
            error!(error = %e, user_id = %q.user_id, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let entries = services::filter_log(&user.log.0, from, to, q.limit.map(|l| l as usize));
    let log: Vec<LogEntryView> = entries
        .into_iter()
        .map(|e| LogEntryView {
            description: e.description,
            duration: e.duration,
            date: services::format_date(e.exercise_date),
        })
        .collect();

    Ok(Json(LogResponse {
        id: user.id,
        username: user.username,
        from: from.map(services::format_date),
        to: to.map(services::format_date),
        count: log.len(),
        log,
    }))
}

// An empty query value (`?from=`) counts as absent, like a missing field.
fn parse_bound(raw: Option<&str>) -> Result<Option<OffsetDateTime>, services::InvalidDate> {
    match raw {
        Some(s) if !s.trim().is_empty() => services::parse_date(s).map(Some),
        _ => Ok(None),
    }
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
