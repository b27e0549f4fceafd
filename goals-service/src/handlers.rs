//! Goal resource handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    error::{Error, Result},
    models::{CreateGoalRequest, CreateGoalResponse, ListGoalsResponse},
    responses::{Created, Message},
    state::AppState,
};

/// List every stored goal
pub async fn list_goals(State(state): State<AppState>) -> Result<Json<ListGoalsResponse>> {
    tracing::info!("Trying to fetch goals");

    let goals = state.goals().list().await?;

    tracing::info!(count = goals.len(), "Fetched goals");
    Ok(Json(ListGoalsResponse { goals }))
}

/// Store a new goal
///
/// Bodies that are not JSON, or whose `text` is missing, blank or not a
/// string, are rejected before the store is touched.
pub async fn create_goal(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<Created<CreateGoalResponse>> {
    tracing::info!("Trying to store goal");

    let Json(request) = body.map_err(|rejection| {
        tracing::debug!("Unreadable goal body: {}", rejection.body_text());
        Error::InvalidInput
    })?;
    let text = request.validate()?;

    let goal = state.goals().insert(&text).await?;

    tracing::info!(id = %goal.id, "Stored new goal");
    let location = format!("/goals/{}", goal.id);
    Ok(Created::new(CreateGoalResponse::saved(goal)).with_location(location))
}

/// Delete a goal by id
///
/// Unknown ids are not an error.
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Message> {
    tracing::info!(id = %id, "Trying to delete goal");

    state.goals().delete(&id).await?;

    tracing::info!(id = %id, "Deleted goal");
    Ok(Message::new("Deleted goal!"))
}
