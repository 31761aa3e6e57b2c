use serde::{Deserialize, Serialize};

use crate::movie::MovieQuery;
use crate::search::{SearchModel, SearchOutcome, AGENT_ERROR_NOTICE};

/// Fields of the movie form, as posted by the browser.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct MovieForm {
    #[serde(default)]
    pub movie_name: String,
    #[serde(default)]
    pub movie_year: String,
    #[serde(default)]
    pub preferences: String,
}

impl MovieForm {
    pub fn to_query(&self) -> MovieQuery {
        MovieQuery::new(&self.movie_name, &self.movie_year).preferences(&self.preferences)
    }
}

/// Fields of the search form. The model arrives as its identifier.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// JSON body of `POST /api/movies`. Same fields as the form.
pub type MovieRequest = MovieForm;

/// Response of `POST /api/movies`
#[derive(Serialize, Deserialize, Debug)]
pub struct MovieResponse {
    /// Markdown produced by the model
    pub recommendations: String,
}

/// JSON body of `POST /api/search`
#[derive(Deserialize, Debug)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub model: SearchModel,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Results,
    NoResults,
    Error,
}

/// Response of `POST /api/search`
#[derive(Serialize, Deserialize, Debug)]
pub struct SearchResponse {
    pub status: SearchStatus,
    pub content: Option<String>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Results(text) => Self {
                status: SearchStatus::Results,
                content: Some(text),
            },
            SearchOutcome::NoResults => Self {
                status: SearchStatus::NoResults,
                content: None,
            },
            SearchOutcome::Error(_) => Self {
                status: SearchStatus::Error,
                content: Some(AGENT_ERROR_NOTICE.to_string()),
            },
        }
    }
}

/// Body of every JSON error reply
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
