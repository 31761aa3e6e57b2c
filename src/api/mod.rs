//! Web front end for both flows.
//!
//! Serves HTML pages with forms for browsers plus JSON endpoints under `/api`.

mod handlers;
mod pages;
mod types;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;

use crate::{error::LLMError, movie::MovieRecommender, search::SearchPipeline};

pub use pages::{escape_html, render_markdown};
pub use types::{
    ErrorResponse, MovieForm, MovieRequest, MovieResponse, SearchForm, SearchRequest,
    SearchResponse, SearchStatus,
};

/// Owns the flow handlers built at startup.
pub struct Server {
    movies: Arc<MovieRecommender>,
    search: Arc<SearchPipeline>,
}

/// Internal server state shared between request handlers
#[derive(Clone)]
struct ServerState {
    movies: Arc<MovieRecommender>,
    search: Arc<SearchPipeline>,
}

impl Server {
    pub fn new(movies: MovieRecommender, search: SearchPipeline) -> Self {
        Self {
            movies: Arc::new(movies),
            search: Arc::new(search),
        }
    }

    /// Builds the router without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/movies", get(handlers::movies_form).post(handlers::movies_submit))
            .route("/search", get(handlers::search_form).post(handlers::search_submit))
            .route("/api/movies", post(handlers::api_movies))
            .route("/api/search", post(handlers::api_search))
            .layer(CorsLayer::permissive())
            .with_state(ServerState {
                movies: self.movies.clone(),
                search: self.search.clone(),
            })
    }

    /// Starts the server and listens for requests on `addr`
    pub async fn run(self, addr: &str) -> Result<(), LLMError> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| LLMError::InvalidRequest(format!("Cannot bind {addr}: {e}")))?;
        log::info!("listening on http://{addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| LLMError::Generic(e.to_string()))?;

        Ok(())
    }
}
