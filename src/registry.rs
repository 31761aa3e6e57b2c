//! Provider clients prebuilt at startup, one per selectable search model.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::LLMError, search::SearchModel, LLMProvider};

/// Stores one client per [`SearchModel`].
#[derive(Default)]
pub struct ProviderRegistry {
    backends: HashMap<SearchModel, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Inserts a client for a model, replacing any previous one
    pub fn insert(&mut self, model: SearchModel, llm: Arc<dyn LLMProvider>) {
        self.backends.insert(model, llm);
    }

    /// Retrieves the client for a model
    pub fn get(&self, model: SearchModel) -> Result<Arc<dyn LLMProvider>, LLMError> {
        self.backends.get(&model).cloned().ok_or_else(|| {
            LLMError::InvalidRequest(format!("No provider configured for model {}", model.id()))
        })
    }

    /// Builds a registry covering every [`SearchModel`], using `make` for each one.
    pub fn for_all_models<F>(mut make: F) -> Result<Self, LLMError>
    where
        F: FnMut(SearchModel) -> Result<Arc<dyn LLMProvider>, LLMError>,
    {
        let mut registry = Self::new();
        for model in SearchModel::ALL {
            registry.insert(model, make(model)?);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

/// Builder pattern for ProviderRegistry
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    registry: ProviderRegistry,
}

impl ProviderRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client for the given model
    pub fn register(mut self, model: SearchModel, llm: Arc<dyn LLMProvider>) -> Self {
        self.registry.insert(model, llm);
        self
    }

    /// Builds the final ProviderRegistry
    pub fn build(self) -> ProviderRegistry {
        self.registry
    }
}
