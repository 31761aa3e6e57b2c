//! Process-wide configuration, read once at startup.
//!
//! Values come from the environment, after loading an optional `.env` file
//! from the working directory.

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    builder::{LLMBackend, LLMBuilder},
    error::LLMError,
    movie::{MovieRecommender, MOVIE_MODEL},
    registry::ProviderRegistry,
    search::SearchPipeline,
    tools::DuckDuckGo,
};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Key for the movie flow (`GOOGLE_API_KEY`)
    pub google_api_key: Option<String>,
    /// Key for the search flow (`GROQ_API_KEY`)
    pub groq_api_key: Option<String>,
    pub google_base_url: Option<String>,
    pub groq_base_url: Option<String>,
    /// Address the web UI binds to
    pub addr: String,
    /// Provider request timeout. Unset means requests may block indefinitely.
    pub timeout_seconds: Option<u64>,
    pub search_max_results: usize,
    pub agent_max_turns: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            groq_api_key: None,
            google_base_url: None,
            groq_base_url: None,
            addr: DEFAULT_ADDR.to_string(),
            timeout_seconds: None,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
            agent_max_turns: crate::agent::DEFAULT_MAX_TURNS,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, LLMError> {
        if let Err(e) = dotenv::dotenv() {
            log::debug!("no .env file loaded: {e}");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LLMError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            google_api_key: get("GOOGLE_API_KEY"),
            groq_api_key: get("GROQ_API_KEY"),
            google_base_url: get("GOOGLE_BASE_URL"),
            groq_base_url: get("GROQ_BASE_URL"),
            addr: get("COMPANION_ADDR").unwrap_or(defaults.addr),
            timeout_seconds: parse_var("COMPANION_TIMEOUT_SECONDS", get("COMPANION_TIMEOUT_SECONDS"))?,
            search_max_results: parse_var(
                "COMPANION_SEARCH_MAX_RESULTS",
                get("COMPANION_SEARCH_MAX_RESULTS"),
            )?
            .unwrap_or(defaults.search_max_results),
            agent_max_turns: parse_var("COMPANION_AGENT_MAX_TURNS", get("COMPANION_AGENT_MAX_TURNS"))?
                .unwrap_or(defaults.agent_max_turns),
        };
        config.check_limits()?;
        Ok(config)
    }

    /// Rejects limits that would make every search fail.
    pub fn check_limits(&self) -> Result<(), LLMError> {
        if self.search_max_results == 0 {
            return Err(LLMError::InvalidRequest(
                "COMPANION_SEARCH_MAX_RESULTS must be at least 1".to_string(),
            ));
        }
        if self.agent_max_turns == 0 {
            return Err(LLMError::InvalidRequest(
                "COMPANION_AGENT_MAX_TURNS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the Gemini client for the movie flow.
    ///
    /// A missing key is only logged: the first request fails with an auth error.
    pub fn build_movie_recommender(&self) -> Result<MovieRecommender, LLMError> {
        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(key_or_warn(&self.google_api_key, "GOOGLE_API_KEY"))
            .model(MOVIE_MODEL);
        if let Some(url) = &self.google_base_url {
            builder = builder.base_url(url);
        }
        if let Some(timeout) = self.timeout_seconds {
            builder = builder.timeout_seconds(timeout);
        }
        Ok(MovieRecommender::new(builder.build_shared()?))
    }

    /// Builds one Groq client per search model plus the web search backend.
    pub fn build_search_pipeline(&self) -> Result<SearchPipeline, LLMError> {
        self.check_limits()?;
        let api_key = key_or_warn(&self.groq_api_key, "GROQ_API_KEY");
        let registry = ProviderRegistry::for_all_models(|model| {
            let mut builder = LLMBuilder::new()
                .backend(LLMBackend::Groq)
                .api_key(api_key.clone())
                .model(model.id());
            if let Some(url) = &self.groq_base_url {
                builder = builder.base_url(url);
            }
            if let Some(timeout) = self.timeout_seconds {
                builder = builder.timeout_seconds(timeout);
            }
            builder.build_shared()
        })?;

        let web_search = DuckDuckGo::new(None, self.timeout_seconds)?;
        Ok(
            SearchPipeline::new(Arc::new(registry), Arc::new(web_search))
                .max_results(self.search_max_results)
                .max_turns(self.agent_max_turns),
        )
    }
}

fn key_or_warn(key: &Option<String>, var: &str) -> String {
    match key {
        Some(key) => key.clone(),
        None => {
            log::warn!("{var} is not set; requests to this provider will fail");
            String::new()
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, LLMError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| LLMError::InvalidRequest(format!("Invalid {name} {v:?}: {e}")))
        })
        .transpose()
}
