//! Related-content lookup with caching.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use khozo_cache::CacheManager;
use khozo_cache::keys;
use khozo_core::AppError;
use khozo_core::config::RelatedConfig;
use crate::context::RequestContext;
use khozo_core::result::AppResult;
use khozo_core::traits::CacheProvider;
use khozo_database::store::OpportunityStore;
use khozo_entity::opportunity::{Opportunity, OpportunityCategory, OpportunityKind};

use super::scorer;
use crate::opportunity::load_owned;

/// Parameters of a related-content lookup.
#[derive(Debug, Clone)]
pub struct RelatedQuery {
    /// The source item.
    pub item_id: Uuid,
    /// Maximum results; the configured default when absent.
    pub limit: Option<usize>,
    /// Minimum similarity; the configured default when absent.
    pub min_similarity: Option<f64>,
    /// Restrict candidates to these kinds. Empty means all.
    pub include_types: Option<Vec<OpportunityKind>>,
}

impl RelatedQuery {
    /// Query for `item_id` with every default.
    pub fn new(item_id: Uuid) -> Self {
        Self {
            item_id,
            limit: None,
            min_similarity: None,
            include_types: None,
        }
    }
}

/// One ranked related item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    /// Item id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Record type.
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    /// Category.
    pub category: OpportunityCategory,
    /// Weighted similarity in `[0, 1]`.
    pub similarity: f64,
    /// Why the item is related.
    pub reason: String,
    /// Reminder deadline, if known.
    pub deadline: Option<NaiveDate>,
    /// Tags.
    pub tags: Vec<String>,
}

/// Ranks catalogue items by similarity to a source item.
#[derive(Debug, Clone)]
pub struct RelatedService {
    opportunities: Arc<dyn OpportunityStore>,
    cache: CacheManager,
    config: RelatedConfig,
}

impl RelatedService {
    /// Creates a new related-content service.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        cache: CacheManager,
        config: RelatedConfig,
    ) -> Self {
        Self {
            opportunities,
            cache,
            config,
        }
    }

    /// Items similar to the source, best first.
    ///
    /// The source must belong to the caller and candidates are drawn from
    /// the caller's own catalogue.
    pub async fn get_related(
        &self,
        ctx: &RequestContext,
        query: RelatedQuery,
    ) -> AppResult<Vec<RelatedItem>> {
        let min_similarity = query
            .min_similarity
            .unwrap_or(self.config.default_min_similarity);
        if !(0.0..=1.0).contains(&min_similarity) {
            return Err(AppError::validation(
                "min_similarity must be between 0 and 1",
            ));
        }
        let limit = query.limit.unwrap_or(self.config.default_limit);
        let kinds = query.include_types.filter(|k| !k.is_empty());
        let source = load_owned(self.opportunities.as_ref(), ctx, query.item_id).await?;

        let type_names: Option<Vec<&str>> = kinds
            .as_ref()
            .map(|k| k.iter().map(OpportunityKind::as_str).collect());
        let cache_key = keys::related(query.item_id, min_similarity, type_names.as_deref());

        match self.cache.get_json::<Vec<RelatedItem>>(&cache_key).await {
            Ok(Some(mut ranked)) => {
                debug!(item_id = %query.item_id, "Related content cache hit");
                ranked.truncate(limit);
                return Ok(ranked);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %cache_key, error = %e, "Related content cache read failed"),
        }

        let mut ranked = self.rank(&source, min_similarity, kinds.as_deref()).await?;

        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);
        if let Err(e) = self.cache.set_json(&cache_key, &ranked, ttl).await {
            warn!(key = %cache_key, error = %e, "Related content cache write failed");
        }

        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn rank(
        &self,
        source: &Opportunity,
        min_similarity: f64,
        kinds: Option<&[OpportunityKind]>,
    ) -> AppResult<Vec<RelatedItem>> {
        let candidates = self
            .opportunities
            .list_candidates(
                source.user_id,
                source.id,
                kinds,
                self.config.candidate_limit as u64,
            )
            .await?;

        let mut ranked: Vec<RelatedItem> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let breakdown = scorer::score(source, &candidate);
                let similarity = breakdown.total();
                (similarity >= min_similarity).then(|| RelatedItem {
                    id: candidate.id,
                    deadline: candidate.deadline(),
                    title: candidate.title,
                    kind: candidate.kind,
                    category: candidate.category,
                    similarity,
                    reason: breakdown.reason().to_string(),
                    tags: candidate.tags,
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khozo_core::error::ErrorKind;
    use khozo_entity::opportunity::Opportunity;

    use crate::testing::{Harness, create_input};

    async fn add(
        h: &Harness,
        title: &str,
        category: OpportunityCategory,
        kind: OpportunityKind,
        tags: &[&str],
    ) -> Opportunity {
        let mut input = create_input(title);
        input.category = category;
        input.kind = kind;
        input.tags = tags.iter().map(|t| t.to_string()).collect();
        h.opportunities.create(&h.ctx, input).await.unwrap()
    }

    #[tokio::test]
    async fn test_results_exclude_source_and_respect_threshold() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "SSC Combined Graduate Level", OpportunityCategory::Exam, OpportunityKind::Application, &["ssc", "graduate"]).await;
        let close = add(&h, "SSC Combined Higher Secondary", OpportunityCategory::Exam, OpportunityKind::Application, &["ssc"]).await;
        add(&h, "PM Kisan Samman Nidhi", OpportunityCategory::Scheme, OpportunityKind::Scheme, &["farmer"]).await;

        let items = h.related.get_related(&h.ctx, RelatedQuery::new(source.id)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, close.id);
        assert_eq!(items[0].reason, "Same category");
        assert!(items.iter().all(|i| i.id != source.id));
        assert!(items.iter().all(|i| i.similarity >= 0.3 && i.similarity <= 1.0));
    }

    #[tokio::test]
    async fn test_results_are_sorted_and_limited() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "Railway Group D", OpportunityCategory::Job, OpportunityKind::Application, &["railway", "10th"]).await;
        let weaker = add(&h, "Army Agniveer", OpportunityCategory::Job, OpportunityKind::Application, &[]).await;
        let stronger = add(&h, "Railway NTPC", OpportunityCategory::Job, OpportunityKind::Application, &["railway", "10th"]).await;

        let items = h.related.get_related(&h.ctx, RelatedQuery::new(source.id)).await.unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![stronger.id, weaker.id]);
        assert!(items.windows(2).all(|w| w[0].similarity >= w[1].similarity));

        let query = RelatedQuery {
            limit: Some(1),
            ..RelatedQuery::new(source.id)
        };
        let items = h.related.get_related(&h.ctx, query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, stronger.id);
    }

    #[tokio::test]
    async fn test_include_types_filters_candidates() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "Startup India Seed Fund", OpportunityCategory::Startup, OpportunityKind::Scheme, &["startup"]).await;
        add(&h, "Startup Grant Program", OpportunityCategory::Startup, OpportunityKind::Program, &["startup"]).await;
        let scheme = add(&h, "Startup Credit Guarantee", OpportunityCategory::Startup, OpportunityKind::Scheme, &["startup"]).await;

        let query = RelatedQuery {
            include_types: Some(vec![OpportunityKind::Scheme]),
            min_similarity: Some(0.0),
            ..RelatedQuery::new(source.id)
        };
        let items = h.related.get_related(&h.ctx, query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, scheme.id);
    }

    #[tokio::test]
    async fn test_zero_score_candidates_are_excluded_at_positive_threshold() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "Bihar Police Constable", OpportunityCategory::Job, OpportunityKind::Application, &["police"]).await;
        add(&h, "Startup Seed Fund", OpportunityCategory::Startup, OpportunityKind::Scheme, &["founder"]).await;

        let query = RelatedQuery {
            min_similarity: Some(0.01),
            ..RelatedQuery::new(source.id)
        };
        assert!(h.related.get_related(&h.ctx, query).await.unwrap().is_empty());

        let query = RelatedQuery {
            min_similarity: Some(0.0),
            ..RelatedQuery::new(source.id)
        };
        let items = h.related.get_related(&h.ctx, query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].similarity, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_threshold_and_missing_source() {
        let h = Harness::at(2025, 11, 1);
        let query = RelatedQuery {
            min_similarity: Some(1.5),
            ..RelatedQuery::new(Uuid::new_v4())
        };
        let err = h.related.get_related(&h.ctx, query).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = h
            .related
            .get_related(&h.ctx, RelatedQuery::new(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_source_and_candidates_are_scoped_to_the_caller() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "UPSC Civil Services", OpportunityCategory::Exam, OpportunityKind::Application, &["upsc"]).await;
        let own = add(&h, "UPSC Engineering Services", OpportunityCategory::Exam, OpportunityKind::Application, &["upsc"]).await;

        let other = RequestContext::new(Uuid::new_v4());
        let mut input = create_input("UPSC Forest Service");
        input.category = OpportunityCategory::Exam;
        input.tags = vec!["upsc".to_string()];
        let foreign = h.opportunities.create(&other, input).await.unwrap();

        let items = h.related.get_related(&h.ctx, RelatedQuery::new(source.id)).await.unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![own.id]);

        let err = h
            .related
            .get_related(&other, RelatedQuery::new(source.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let items = h.related.get_related(&other, RelatedQuery::new(foreign.id)).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_cached_result_is_served_within_ttl() {
        let h = Harness::at(2025, 11, 1);
        let source = add(&h, "IBPS Clerk", OpportunityCategory::Job, OpportunityKind::Application, &["bank"]).await;
        add(&h, "SBI Clerk", OpportunityCategory::Job, OpportunityKind::Application, &["bank"]).await;

        let first = h.related.get_related(&h.ctx, RelatedQuery::new(source.id)).await.unwrap();
        add(&h, "RBI Assistant", OpportunityCategory::Job, OpportunityKind::Application, &["bank"]).await;
        let cached = h.related.get_related(&h.ctx, RelatedQuery::new(source.id)).await.unwrap();
        assert_eq!(first, cached);
        assert_eq!(cached.len(), 1);

        let query = RelatedQuery {
            min_similarity: Some(0.31),
            ..RelatedQuery::new(source.id)
        };
        let fresh = h.related.get_related(&h.ctx, query).await.unwrap();
        assert_eq!(fresh.len(), 2);
    }
}
