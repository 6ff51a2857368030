//! Category routing and concurrent adapter fan-out.
//!
//! Each specific category maps to the ordered list of adapters that serve
//! it. The general route queries the web-search adapters and, alongside,
//! every specific route with a reduced per-category cap.

use std::sync::Arc;

use futures::future::join_all;

use crate::adapter::{AdapterHandle, FetchRequest};
use crate::provider::ProviderId;
use crate::query::OpportunityQuery;
use crate::synthetic::{self, FALLBACK_SOURCE};
use crate::types::{Category, Opportunity};

use super::dedup::deduplicate;

/// Dispatches a query to the adapters serving its category.
#[derive(Debug, Clone)]
pub struct CategoryRouter {
    handles: Vec<AdapterHandle>,
    results_per_provider: usize,
    results_per_category: usize,
}

impl CategoryRouter {
    /// `handles` must be in provider declaration order; route output is
    /// concatenated in that order.
    pub fn new(
        handles: Vec<AdapterHandle>,
        results_per_provider: usize,
        results_per_category: usize,
    ) -> Self {
        Self {
            handles,
            results_per_provider,
            results_per_category,
        }
    }

    /// Providers consulted for `category`, in order.
    pub fn providers_for(&self, category: Category) -> Vec<ProviderId> {
        self.serving(category).map(AdapterHandle::provider).collect()
    }

    /// Unscored results for `query`.
    pub async fn route(&self, query: &OpportunityQuery) -> Vec<Opportunity> {
        let category = query.category_kind();
        tracing::debug!(%category, "routing query");
        match category {
            Category::General => self.general(query).await,
            specific => {
                deduplicate(self.category_path(specific, query, self.results_per_provider).await)
            }
        }
    }

    fn serving(&self, category: Category) -> impl Iterator<Item = &AdapterHandle> {
        self.handles
            .iter()
            .filter(move |h| h.descriptor().serves(category))
    }

    /// One category's adapters, falling back to the category generator
    /// when they all come back empty.
    async fn category_path(
        &self,
        category: Category,
        query: &OpportunityQuery,
        limit: usize,
    ) -> Vec<Opportunity> {
        let results = self.fan_out(category, query, limit).await;
        if results.is_empty() {
            tracing::debug!(%category, "every adapter empty; using category fallback");
            return synthetic::generate(category, FALLBACK_SOURCE, query, limit);
        }
        results
    }

    /// Web search plus a capped slice of every specific category.
    async fn general(&self, query: &OpportunityQuery) -> Vec<Opportunity> {
        let cap = self.results_per_category;
        let web = self.fan_out(Category::General, query, self.results_per_provider);
        let categories = join_all(
            Category::specific()
                .iter()
                .map(|category| self.category_path(*category, query, cap)),
        );
        let (web, categories) = futures::join!(web, categories);

        let mut results = web;
        for mut batch in categories {
            batch.truncate(cap);
            results.extend(batch);
        }
        deduplicate(results)
    }

    /// Run every adapter serving `category` concurrently, each in its own
    /// task, and concatenate their output in declaration order. A task that
    /// panics contributes nothing.
    async fn fan_out(
        &self,
        category: Category,
        query: &OpportunityQuery,
        limit: usize,
    ) -> Vec<Opportunity> {
        let shared = Arc::new(query.clone());
        let (providers, tasks): (Vec<ProviderId>, Vec<_>) = self
            .serving(category)
            .map(|handle| {
                let handle = handle.clone();
                let query = Arc::clone(&shared);
                let provider = handle.provider();
                let task = tokio::spawn(async move {
                    handle
                        .fetch(&FetchRequest {
                            query: query.as_ref(),
                            category,
                            limit,
                        })
                        .await
                });
                (provider, task)
            })
            .unzip();

        let outcomes = join_all(tasks).await;

        let mut results = Vec::new();
        for (provider, outcome) in providers.into_iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    tracing::debug!(%provider, %category, count = batch.len(), "adapter finished");
                    results.extend(batch);
                }
                Err(err) => {
                    tracing::warn!(%provider, %category, error = %err, "adapter task failed");
                }
            }
        }
        results
    }
}
