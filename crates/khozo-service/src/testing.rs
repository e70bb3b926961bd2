//! Shared fixtures for service tests: every service wired over one
//! in-memory store, a pinned clock and a scripted push gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use khozo_cache::CacheManager;
use khozo_cache::memory::MemoryCacheProvider;
use khozo_core::config::{
    LifecycleConfig, NotificationConfig, RelatedConfig, TrendingConfig,
};
use khozo_core::result::AppResult;
use khozo_core::traits::{Clock, FixedClock, PushDelivery, PushGateway, PushMessage};
use khozo_database::memory::MemoryStore;
use khozo_database::store::Stores;
use khozo_entity::opportunity::{
    Eligibility, ImportantDates, OpportunityCategory, OpportunityKind,
};

use crate::context::RequestContext;
use crate::engagement::EngagementService;
use crate::lifecycle::LifecycleService;
use crate::notification::{
    DeviceService, NotificationCentreService, NotificationDispatcher, NotificationScheduler,
};
use crate::opportunity::{CreateOpportunity, OpportunityService};
use crate::related::RelatedService;
use crate::trending::TrendingService;

/// Gateway that accepts every token unless told otherwise.
#[derive(Debug, Default)]
pub struct MockGateway {
    rejections: Mutex<HashMap<String, (String, bool)>>,
    sent: Mutex<Vec<String>>,
}

impl MockGateway {
    /// Make `token` be rejected with `reason`.
    pub fn reject(&self, token: &str, reason: &str, token_invalid: bool) {
        self.rejections
            .lock()
            .unwrap()
            .insert(token.to_string(), (reason.to_string(), token_invalid));
    }

    /// Every token a send was attempted for, in order.
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for MockGateway {
    async fn send(&self, token: &str, _message: &PushMessage) -> AppResult<PushDelivery> {
        self.sent.lock().unwrap().push(token.to_string());
        let outcome = match self.rejections.lock().unwrap().get(token) {
            Some((reason, token_invalid)) => PushDelivery::Rejected {
                reason: reason.clone(),
                token_invalid: *token_invalid,
            },
            None => PushDelivery::Delivered,
        };
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Every service over one memory store.
pub struct Harness {
    pub stores: Stores,
    pub clock: Arc<FixedClock>,
    pub ctx: RequestContext,
    pub gateway: Arc<MockGateway>,
    pub opportunities: OpportunityService,
    pub lifecycle: LifecycleService,
    pub scheduler: Arc<NotificationScheduler>,
    pub dispatcher: NotificationDispatcher,
    pub centre: NotificationCentreService,
    pub devices: DeviceService,
    pub related: RelatedService,
    pub trending: TrendingService,
    pub engagement: EngagementService,
}

impl Harness {
    /// Harness whose clock reads midnight UTC on the given day.
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self::build(year, month, day, LifecycleConfig::default())
    }

    /// Like [`Harness::at`] with strict transition validation.
    pub fn strict(year: i32, month: u32, day: u32) -> Self {
        Self::build(
            year,
            month,
            day,
            LifecycleConfig {
                strict_transitions: true,
            },
        )
    }

    fn build(year: i32, month: u32, day: u32, lifecycle: LifecycleConfig) -> Self {
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap(),
        ));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let gateway = Arc::new(MockGateway::default());
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(1_000)));
        let notification = NotificationConfig::default();

        let scheduler = Arc::new(
            NotificationScheduler::new(
                stores.opportunities.clone(),
                stores.jobs.clone(),
                dyn_clock.clone(),
                &notification,
            )
            .unwrap(),
        );

        Self {
            ctx: RequestContext::new(Uuid::new_v4()),
            opportunities: OpportunityService::new(
                stores.opportunities.clone(),
                scheduler.clone(),
                dyn_clock.clone(),
            ),
            lifecycle: LifecycleService::new(
                stores.opportunities.clone(),
                stores.status_history.clone(),
                stores.jobs.clone(),
                stores.engagement.clone(),
                dyn_clock.clone(),
                lifecycle,
            ),
            dispatcher: NotificationDispatcher::new(
                stores.jobs.clone(),
                stores.devices.clone(),
                stores.deliveries.clone(),
                stores.dispatch_stats.clone(),
                gateway.clone(),
                dyn_clock.clone(),
                notification,
            ),
            centre: NotificationCentreService::new(stores.deliveries.clone(), dyn_clock.clone()),
            devices: DeviceService::new(stores.devices.clone(), dyn_clock.clone()),
            related: RelatedService::new(
                stores.opportunities.clone(),
                cache.clone(),
                RelatedConfig::default(),
            ),
            trending: TrendingService::new(
                stores.opportunities.clone(),
                stores.engagement.clone(),
                cache,
                dyn_clock.clone(),
                TrendingConfig::default(),
            ),
            engagement: EngagementService::new(
                stores.opportunities.clone(),
                stores.engagement.clone(),
                stores.viewing_history.clone(),
                dyn_clock,
            ),
            scheduler,
            gateway,
            clock,
            stores,
        }
    }
}

/// Minimal creation input: an exam application with no dates.
pub fn create_input(title: &str) -> CreateOpportunity {
    CreateOpportunity {
        title: title.to_string(),
        description: None,
        category: OpportunityCategory::Exam,
        kind: OpportunityKind::Application,
        tags: Vec::new(),
        eligibility: Eligibility::default(),
        important_dates: ImportantDates::default(),
        preferences: None,
    }
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
