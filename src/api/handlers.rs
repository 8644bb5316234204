use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use super::types::{
    answer_list_schema, answer_schema, AiAnswer, AiAnswerList, ChatParams, TemplateParams,
};
use super::ServerState;
use crate::chat::ChatOptions;
use crate::error::LlmError;
use crate::template::{PromptTemplate, SystemPromptTemplate};

/// Template shared by the template and expert endpoints.
const SPORT_TEMPLATE: &str =
    "Explain briefly about {sport} in 100 words, and also provide a short summary of {player}.";

/// System prompt for the expert endpoint.
const EXPERT_SYSTEM: &str =
    "You are a world-class football expert who provides clear, accurate, and insightful facts.";

/// Validates the Bearer token when the server has an auth key configured.
fn authorize(state: &ServerState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(key) = &state.auth_key else {
        return Ok(());
    };

    let auth_header = headers.get("Authorization").ok_or((
        StatusCode::UNAUTHORIZED,
        "Missing authorization".to_string(),
    ))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid authorization header".to_string(),
        )
    })?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token == key => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "Invalid API key".to_string())),
    }
}

/// Provider and mapping failures become plain 500s; nothing is retried or
/// recovered locally.
fn internal_error(e: LlmError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// `GET /api/v1/chat?prompt=` — forwards the prompt and returns the raw
/// model reply as plain text. Usage metadata is logged per request.
pub async fn chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<ChatParams>,
) -> Result<String, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let request_id = Uuid::new_v4();

    let response = state
        .client
        .prompt(&params.prompt)
        .call()
        .await
        .map_err(internal_error)?;

    if let Some(usage) = response.usage() {
        log::info!(
            "chat [{request_id}] usage: prompt={} completion={} total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    Ok(response.into_content())
}

/// `GET /api/v1/chat/response?prompt=` — forwards the prompt and maps the
/// reply into a single [`AiAnswer`].
pub async fn answer(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<ChatParams>,
) -> Result<Json<AiAnswer>, (StatusCode, String)> {
    authorize(&state, &headers)?;

    let answer: AiAnswer = state
        .client
        .prompt(&params.prompt)
        .schema(answer_schema())
        .call()
        .await
        .and_then(|r| r.entity())
        .map_err(internal_error)?;

    Ok(Json(answer))
}

/// `GET /api/v1/chat/responses?prompt=` — forwards the prompt and maps the
/// reply into a list of [`AiAnswer`] objects.
pub async fn answer_list(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<ChatParams>,
) -> Result<Json<Vec<AiAnswer>>, (StatusCode, String)> {
    authorize(&state, &headers)?;

    let list: AiAnswerList = state
        .client
        .prompt(&params.prompt)
        .schema(answer_list_schema())
        .call()
        .await
        .and_then(|r| r.entity())
        .map_err(internal_error)?;

    Ok(Json(list.answers))
}

/// `GET /api/v1/chat/tuned?prompt=` — same pass-through as `/chat`, but with
/// generation options set for this prompt only, overriding the client-wide
/// defaults.
pub async fn tuned(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<ChatParams>,
) -> Result<String, (StatusCode, String)> {
    authorize(&state, &headers)?;

    let options = ChatOptions::new()
        .model("gpt-4o")
        .max_tokens(200)
        .temperature(0.5)
        .frequency_penalty(0.2)
        .presence_penalty(0.1)
        .top_p(1.0);

    let response = state
        .client
        .prompt(&params.prompt)
        .options(options)
        .call()
        .await
        .map_err(internal_error)?;

    Ok(response.into_content())
}

/// `GET /api/v1/chat/template?sport=&player=` — renders a prompt template
/// with the given variables and forwards the result.
pub async fn template(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<TemplateParams>,
) -> Result<String, (StatusCode, String)> {
    authorize(&state, &headers)?;

    let sport = params.sport.as_deref().unwrap_or("Football");
    let player = params.player.as_deref().unwrap_or("Harry Kane");

    let rendered = PromptTemplate::new(SPORT_TEMPLATE)
        .render(&HashMap::from([("sport", sport), ("player", player)]))
        .map_err(internal_error)?;

    let response = state
        .client
        .prompt(rendered)
        .call()
        .await
        .map_err(internal_error)?;

    Ok(response.into_content())
}

/// `GET /api/v1/chat/expert?sport=&player=` — combines a system template
/// framing the model as a domain expert with a rendered user template.
pub async fn expert(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<TemplateParams>,
) -> Result<String, (StatusCode, String)> {
    authorize(&state, &headers)?;

    let sport = params.sport.as_deref().unwrap_or("football");
    let player = params.player.as_deref().unwrap_or("Wayne Rooney");

    let system_message = SystemPromptTemplate::new(EXPERT_SYSTEM)
        .create_message()
        .map_err(internal_error)?;
    let user_message = PromptTemplate::new(SPORT_TEMPLATE)
        .create_message(&HashMap::from([("sport", sport), ("player", player)]))
        .map_err(internal_error)?;

    let response = state
        .client
        .request()
        .message(system_message)
        .message(user_message)
        .call()
        .await
        .map_err(internal_error)?;

    Ok(response.into_content())
}
