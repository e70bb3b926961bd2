//! Trending aggregation with caching.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use khozo_cache::CacheManager;
use khozo_cache::keys;
use khozo_core::config::TrendingConfig;
use crate::context::RequestContext;
use khozo_core::result::AppResult;
use khozo_core::traits::{CacheProvider, Clock};
use khozo_database::store::{EngagementStore, OpportunityStore};
use khozo_entity::engagement::EngagementCounts;
use khozo_entity::opportunity::{OpportunityCategory, OpportunityKind};

use super::window::TimeWindow;

/// One trending entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingItem {
    /// Item id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Category.
    pub category: OpportunityCategory,
    /// Record type.
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    /// Views inside the window.
    pub view_count: i64,
    /// Applications inside the window.
    pub application_count: i64,
    /// Views, saves and applications inside the window.
    pub engagement: i64,
    /// Percent change against the preceding window of equal length.
    pub growth_rate: f64,
    /// Reminder deadline, if known.
    pub deadline: Option<NaiveDate>,
}

/// Day and week lists side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingOverview {
    /// Last 24 hours.
    pub day: Vec<TrendingItem>,
    /// Last 7 days.
    pub week: Vec<TrendingItem>,
}

/// Ranks opportunities by recent engagement.
#[derive(Debug, Clone)]
pub struct TrendingService {
    opportunities: Arc<dyn OpportunityStore>,
    engagement: Arc<dyn EngagementStore>,
    cache: CacheManager,
    clock: Arc<dyn Clock>,
    config: TrendingConfig,
}

impl TrendingService {
    /// Creates a new trending service.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        engagement: Arc<dyn EngagementStore>,
        cache: CacheManager,
        clock: Arc<dyn Clock>,
        config: TrendingConfig,
    ) -> Self {
        Self {
            opportunities,
            engagement,
            cache,
            clock,
            config,
        }
    }

    /// The caller's most engaged items in `window`, highest first.
    pub async fn get_trending(
        &self,
        ctx: &RequestContext,
        window: TimeWindow,
        limit: Option<usize>,
    ) -> AppResult<Vec<TrendingItem>> {
        let limit = limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1));
        let cache_key = keys::trending(ctx.user_id, window.as_str(), limit as u32);

        match self.cache.get_json::<Vec<TrendingItem>>(&cache_key).await {
            Ok(Some(items)) => {
                debug!(window = %window, "Trending cache hit");
                return Ok(items);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %cache_key, error = %e, "Trending cache read failed"),
        }

        let items = self.compute(ctx.user_id, window, limit).await?;

        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);
        if let Err(e) = self.cache.set_json(&cache_key, &items, ttl).await {
            warn!(key = %cache_key, error = %e, "Trending cache write failed");
        }
        Ok(items)
    }

    /// Day and week lists with the default limit, fetched concurrently.
    pub async fn overview(&self, ctx: &RequestContext) -> AppResult<TrendingOverview> {
        let (day, week) = tokio::join!(
            self.get_trending(ctx, TimeWindow::Day, None),
            self.get_trending(ctx, TimeWindow::Week, None)
        );
        Ok(TrendingOverview {
            day: day?,
            week: week?,
        })
    }

    async fn compute(
        &self,
        user_id: Uuid,
        window: TimeWindow,
        limit: usize,
    ) -> AppResult<Vec<TrendingItem>> {
        let now = self.clock.now();
        let length = window.duration();
        let window_start = now - length;

        let (current, previous) = tokio::join!(
            self.engagement.counts_between(user_id, window_start, now),
            self.engagement
                .counts_between(user_id, window_start - length, window_start)
        );
        let mut current: Vec<EngagementCounts> = current?
            .into_iter()
            .filter(|c| c.engagement() > 0)
            .collect();
        let previous: HashMap<Uuid, i64> = previous?
            .into_iter()
            .map(|c| (c.opportunity_id, c.engagement()))
            .collect();

        current.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
        current.truncate(limit);

        let ids: Vec<Uuid> = current.iter().map(|c| c.opportunity_id).collect();
        let details: HashMap<Uuid, _> = self
            .opportunities
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        let items = current
            .into_iter()
            .filter_map(|counts| {
                let opportunity = details.get(&counts.opportunity_id)?;
                let engagement = counts.engagement();
                let prior = previous.get(&counts.opportunity_id).copied().unwrap_or(0);
                Some(TrendingItem {
                    id: opportunity.id,
                    title: opportunity.title.clone(),
                    category: opportunity.category,
                    kind: opportunity.kind,
                    view_count: counts.views,
                    application_count: counts.applications,
                    engagement,
                    growth_rate: growth_rate(prior, engagement),
                    deadline: opportunity.deadline(),
                })
            })
            .collect();
        Ok(items)
    }
}

/// Percent change from `previous` to `current`; 100 when starting from zero.
fn growth_rate(previous: i64, current: i64) -> f64 {
    match (previous, current) {
        (0, 0) => 0.0,
        (0, _) => 100.0,
        (p, c) => (c - p) as f64 / p as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    use crate::testing::{Harness, create_input};

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(0, 5), 100.0);
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(4, 6), 50.0);
        assert_eq!(growth_rate(4, 2), -50.0);
    }

    #[tokio::test]
    async fn test_ranked_by_windowed_engagement() {
        let h = Harness::at(2025, 11, 1);
        let quiet = h.opportunities.create(&h.ctx, create_input("UPSC CSE")).await.unwrap();
        let busy = h.opportunities.create(&h.ctx, create_input("SSC CGL")).await.unwrap();
        h.opportunities.create(&h.ctx, create_input("Untouched")).await.unwrap();

        h.clock.advance(ChronoDuration::minutes(1));
        h.engagement.track(&h.ctx, quiet.id, "view").await.unwrap();
        for kind in ["view", "save", "view", "share"] {
            h.engagement.track(&h.ctx, busy.id, kind).await.unwrap();
        }

        let items = h.trending.get_trending(&h.ctx, TimeWindow::Day, None).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, busy.id);
        assert_eq!(items[0].engagement, 3);
        assert_eq!(items[0].view_count, 2);
        assert_eq!(items[0].growth_rate, 100.0);
        assert_eq!(items[1].id, quiet.id);
    }

    #[tokio::test]
    async fn test_events_outside_window_are_ignored_and_feed_growth() {
        let h = Harness::at(2025, 11, 1);
        let opp = h.opportunities.create(&h.ctx, create_input("CTET")).await.unwrap();

        h.clock.advance(ChronoDuration::hours(1));
        h.engagement.track(&h.ctx, opp.id, "view").await.unwrap();
        h.engagement.track(&h.ctx, opp.id, "view").await.unwrap();

        // Two days later only the day window has moved past the views.
        h.clock.advance(ChronoDuration::days(2));
        h.engagement.track(&h.ctx, opp.id, "save").await.unwrap();

        let day = h.trending.get_trending(&h.ctx, TimeWindow::Day, None).await.unwrap();
        assert_eq!(day[0].engagement, 1);

        let week = h.trending.get_trending(&h.ctx, TimeWindow::Week, None).await.unwrap();
        assert_eq!(week[0].engagement, 3);
        assert_eq!(week[0].growth_rate, 100.0);
    }

    #[tokio::test]
    async fn test_widening_window_never_lowers_engagement() {
        let h = Harness::at(2025, 11, 1);
        let mut ids = Vec::new();
        for title in ["NEET PG", "CUET UG", "GATE", "CAT"] {
            ids.push(h.opportunities.create(&h.ctx, create_input(title)).await.unwrap().id);
        }

        // Spread events over ten days so the windows see different slices.
        for day in 0..10i64 {
            h.clock.advance(ChronoDuration::days(1));
            for (i, id) in ids.iter().enumerate() {
                if (day + i as i64) % 3 != 0 {
                    h.engagement.track(&h.ctx, *id, "view").await.unwrap();
                }
                if day % (i as i64 + 2) == 0 {
                    h.engagement.track(&h.ctx, *id, "save").await.unwrap();
                }
            }
        }

        let day = h.trending.get_trending(&h.ctx, TimeWindow::Day, Some(50)).await.unwrap();
        let week = h.trending.get_trending(&h.ctx, TimeWindow::Week, Some(50)).await.unwrap();
        let week_by_id: HashMap<Uuid, i64> = week.iter().map(|i| (i.id, i.engagement)).collect();

        assert!(!day.is_empty());
        for item in &day {
            let wider = week_by_id.get(&item.id).copied().unwrap_or(0);
            assert!(
                item.engagement <= wider,
                "{} has {} in the day window but {} in the week window",
                item.title,
                item.engagement,
                wider
            );
        }
        assert!(week.len() >= day.len());
        assert!(week.windows(2).all(|w| w[0].engagement >= w[1].engagement));
    }

    #[tokio::test]
    async fn test_overview_and_cache() {
        let h = Harness::at(2025, 11, 1);
        let opp = h.opportunities.create(&h.ctx, create_input("NDA")).await.unwrap();
        h.clock.advance(ChronoDuration::minutes(1));
        h.engagement.track(&h.ctx, opp.id, "view").await.unwrap();

        let overview = h.trending.overview(&h.ctx).await.unwrap();
        assert_eq!(overview.day.len(), 1);
        assert_eq!(overview.week.len(), 1);

        // Served from cache until the entry expires.
        h.engagement.track(&h.ctx, opp.id, "view").await.unwrap();
        let cached = h.trending.get_trending(&h.ctx, TimeWindow::Day, None).await.unwrap();
        assert_eq!(cached[0].engagement, 1);
    }

    #[tokio::test]
    async fn test_each_user_sees_only_their_own_engagement() {
        let h = Harness::at(2025, 11, 1);
        let opp = h.opportunities.create(&h.ctx, create_input("JEE Main")).await.unwrap();
        h.clock.advance(ChronoDuration::minutes(1));
        h.engagement.track(&h.ctx, opp.id, "view").await.unwrap();

        let mine = h.trending.get_trending(&h.ctx, TimeWindow::Day, None).await.unwrap();
        assert_eq!(mine.len(), 1);

        let other = RequestContext::new(Uuid::new_v4());
        let theirs = h.trending.get_trending(&other, TimeWindow::Day, None).await.unwrap();
        assert!(theirs.is_empty());
    }
}
