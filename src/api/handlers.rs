use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Form, Json,
};
use uuid::Uuid;

use super::pages::{self, Notice, PageOutput};
use super::types::{
    ErrorResponse, MovieForm, MovieRequest, MovieResponse, SearchForm, SearchRequest,
    SearchResponse,
};
use super::ServerState;
use crate::movie::MISSING_FIELDS_ERROR;
use crate::search::{
    SearchModel, SearchOutcome, AGENT_ERROR_NOTICE, EMPTY_QUERY_WARNING, NO_RESULTS_NOTICE,
};

type HtmlResult = Result<Html<String>, (StatusCode, Html<String>)>;
type JsonError = (StatusCode, Json<ErrorResponse>);

fn json_error(status: StatusCode, message: impl Into<String>) -> JsonError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn index() -> Html<String> {
    Html(pages::index())
}

pub async fn movies_form() -> Html<String> {
    Html(pages::movies(&MovieForm::default(), None))
}

/// Handles the movie form.
///
/// Provider failures are not recovered: they become a generic failure page.
pub async fn movies_submit(State(state): State<ServerState>, Form(form): Form<MovieForm>) -> HtmlResult {
    let query = form.to_query();
    if !query.is_complete() {
        let output = PageOutput::notice(Notice::Error, MISSING_FIELDS_ERROR);
        return Ok(Html(pages::movies(&form, Some(&output))));
    }

    let request_id = Uuid::new_v4();
    log::info!("[{request_id}] movie recommendations for {} ({})", query.title, query.year);
    match state.movies.recommend(&query).await {
        Ok(markdown) => Ok(Html(pages::movies(&form, Some(&pages::recommendations(markdown))))),
        Err(e) => {
            log::error!("[{request_id}] movie recommendation failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::failure(&format!("Request failed ({request_id}): {e}"))),
            ))
        }
    }
}

pub async fn search_form() -> Html<String> {
    Html(pages::search(&SearchForm::default(), SearchModel::default(), None))
}

pub async fn search_submit(State(state): State<ServerState>, Form(form): Form<SearchForm>) -> HtmlResult {
    let model = match form.model.as_deref() {
        Some(id) => id.parse::<SearchModel>().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Html(pages::failure(&e.to_string())),
            )
        })?,
        None => SearchModel::default(),
    };

    let output = if form.query.trim().is_empty() {
        PageOutput::notice(Notice::Warning, EMPTY_QUERY_WARNING)
    } else {
        let request_id = Uuid::new_v4();
        log::info!("[{request_id}] search with {model}");
        let report = state.search.run(&form.query, model).await;
        log::debug!("[{request_id}] search stages: {:?}", report.stages);
        match report.outcome {
            SearchOutcome::Results(markdown) => PageOutput {
                markdown: Some(markdown),
                ..PageOutput::default()
            },
            SearchOutcome::NoResults => PageOutput::notice(Notice::Info, NO_RESULTS_NOTICE),
            SearchOutcome::Error(_) => PageOutput::notice(Notice::Error, AGENT_ERROR_NOTICE),
        }
    };

    Ok(Html(pages::search(&form, model, Some(&output))))
}

pub async fn api_movies(
    State(state): State<ServerState>,
    Json(req): Json<MovieRequest>,
) -> Result<Json<MovieResponse>, JsonError> {
    let query = req.to_query();
    if !query.is_complete() {
        return Err(json_error(StatusCode::BAD_REQUEST, MISSING_FIELDS_ERROR));
    }

    let recommendations = state.movies.recommend(&query).await.map_err(|e| {
        log::error!("movie recommendation failed: {e}");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(MovieResponse { recommendations }))
}

pub async fn api_search(
    State(state): State<ServerState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, JsonError> {
    if req.query.trim().is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, EMPTY_QUERY_WARNING));
    }

    let report = state.search.run(&req.query, req.model).await;
    Ok(Json(report.outcome.into()))
}
