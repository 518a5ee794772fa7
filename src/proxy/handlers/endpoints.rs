// GoAPI endpoint handlers
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::dispatch;
use crate::proxy::common::envelope::{ApiReply, FieldErrors};
use crate::proxy::common::validation::{Length, Validator};
use crate::proxy::server::AppState;
use crate::proxy::source::SourceRequest;

pub const CITY_MAX_LEN: usize = 100;
pub const CURRENCY_CODE_LEN: usize = 3;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const DEFAULT_NEWS_CATEGORY: &str = "technology";

type QueryInput = Result<Query<HashMap<String, String>>, QueryRejection>;

/// Query string as a JSON object so every endpoint shares one validator
fn query_input(query: QueryInput) -> Result<Map<String, Value>, ApiReply> {
    match query {
        Ok(Query(params)) => Ok(params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()),
        Err(e) => Err(single_error("query", format!("The query string is malformed: {}", e))),
    }
}

/// JSON object body; an empty body counts as an empty object
fn body_input(body: &Bytes) -> Result<Map<String, Value>, ApiReply> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(single_error("body", "The request body must be a JSON object.".to_string())),
        Err(e) => Err(single_error("body", format!("The request body is not valid JSON: {}", e))),
    }
}

fn single_error(field: &str, message: String) -> ApiReply {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message]);
    ApiReply::validation(errors)
}

/// GET /weather?city=
pub async fn handle_weather(State(state): State<AppState>, query: QueryInput) -> ApiReply {
    let input = match query_input(query) {
        Ok(input) => input,
        Err(reply) => return reply,
    };

    let mut v = Validator::new(&input);
    let city = v.required_string("city", Length::Max(CITY_MAX_LEN));
    let city = match (v.finish(), city) {
        (Ok(()), Some(city)) => city,
        (Err(errors), _) => return ApiReply::validation(errors),
        _ => return ApiReply::fault("weather validation produced no value"),
    };

    dispatch(
        &state.source,
        SourceRequest::Weather { city },
        StatusCode::OK,
        "Weather data retrieved successfully",
    )
    .await
}

/// GET /currency?from=&to=
pub async fn handle_currency(State(state): State<AppState>, query: QueryInput) -> ApiReply {
    let input = match query_input(query) {
        Ok(input) => input,
        Err(reply) => return reply,
    };

    let mut v = Validator::new(&input);
    let from = v.required_string("from", Length::Exact(CURRENCY_CODE_LEN));
    let to = v.required_string("to", Length::Exact(CURRENCY_CODE_LEN));
    let (from, to) = match (v.finish(), from, to) {
        (Ok(()), Some(from), Some(to)) => (from.to_uppercase(), to.to_uppercase()),
        (Err(errors), _, _) => return ApiReply::validation(errors),
        _ => return ApiReply::fault("currency validation produced no value"),
    };

    dispatch(
        &state.source,
        SourceRequest::Currency { from, to },
        StatusCode::OK,
        "Currency rate retrieved successfully",
    )
    .await
}

/// GET /news?category=
pub async fn handle_news(State(state): State<AppState>, query: QueryInput) -> ApiReply {
    let input = match query_input(query) {
        Ok(input) => input,
        Err(reply) => return reply,
    };

    let mut v = Validator::new(&input);
    let category = v.optional_string("category", Length::Max(CATEGORY_MAX_LEN));
    let category = match (v.finish(), category) {
        (Ok(()), Some(category)) => {
            category.unwrap_or_else(|| DEFAULT_NEWS_CATEGORY.to_string())
        }
        (Err(errors), _) => return ApiReply::validation(errors),
        _ => return ApiReply::fault("news validation produced no value"),
    };

    dispatch(
        &state.source,
        SourceRequest::News { category },
        StatusCode::OK,
        "News retrieved successfully",
    )
    .await
}

/// POST /data with `{"payload": {...}}`
pub async fn handle_data(State(state): State<AppState>, body: Bytes) -> ApiReply {
    let input = match body_input(&body) {
        Ok(input) => input,
        Err(reply) => return reply,
    };

    let mut v = Validator::new(&input);
    let payload = v.required_object("payload");
    let payload = match (v.finish(), payload) {
        (Ok(()), Some(payload)) => payload,
        (Err(errors), _) => return ApiReply::validation(errors),
        _ => return ApiReply::fault("data validation produced no value"),
    };

    dispatch(
        &state.source,
        SourceRequest::Data { payload },
        StatusCode::CREATED,
        "Data submitted successfully",
    )
    .await
}
