//! Store traits, one per aggregate, and the [`Stores`] bundle handed to
//! services.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use khozo_core::result::AppResult;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_entity::engagement::{EngagementCounts, EngagementEvent, EngagementKind};
use khozo_entity::history::{StatusHistoryEntry, ViewingHistoryEntry};
use khozo_entity::notification::{
    DailyDispatchStats, DeliveryRecord, DeviceToken, NotificationJob,
};
use khozo_entity::opportunity::{
    ApplicationStatus, NotificationPreferences, Opportunity, OpportunityKind,
};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    DeliveryRepository, DeviceTokenRepository, DispatchStatsRepository, EngagementRepository,
    NotificationJobRepository, OpportunityRepository, StatusHistoryRepository,
    ViewingHistoryRepository,
};

/// Tracked opportunities.
#[async_trait]
pub trait OpportunityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new opportunity.
    async fn insert(&self, opportunity: &Opportunity) -> AppResult<()>;

    /// Fetch one opportunity by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Opportunity>>;

    /// Fetch several opportunities; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Opportunity>>;

    /// Page through a user's opportunities, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Opportunity>>;

    /// Overwrite the lifecycle status. Errors with `NotFound` if the row is gone.
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Overwrite the reminder preferences.
    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Add one to the counter matching `kind`. `Application` has no counter
    /// and is a no-op.
    async fn increment_counter(&self, id: Uuid, kind: EngagementKind) -> AppResult<()>;

    /// Candidates for related-content ranking among `user_id`'s
    /// opportunities, newest first, excluding `exclude_id` and optionally
    /// restricted to `kinds`.
    async fn list_candidates(
        &self,
        user_id: Uuid,
        exclude_id: Uuid,
        kinds: Option<&[OpportunityKind]>,
        limit: u64,
    ) -> AppResult<Vec<Opportunity>>;

    /// Every opportunity that is not archived.
    async fn list_active(&self) -> AppResult<Vec<Opportunity>>;
}

/// Append-only status transition audit.
#[async_trait]
pub trait StatusHistoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append one entry.
    async fn append(&self, entry: &StatusHistoryEntry) -> AppResult<()>;

    /// All entries for an opportunity, oldest first.
    async fn list_for_opportunity(&self, opportunity_id: Uuid)
    -> AppResult<Vec<StatusHistoryEntry>>;
}

/// The notification job queue.
#[async_trait]
pub trait NotificationJobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue one job.
    async fn create(&self, job: &NotificationJob) -> AppResult<()>;

    /// Mark every pending job of the opportunity as dismissed; returns how
    /// many changed.
    async fn dismiss_pending_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<u64>;

    /// Like [`dismiss_pending_for_opportunity`](Self::dismiss_pending_for_opportunity)
    /// but only for deadline reminders (`days_before` set); status notices
    /// stay pending.
    async fn dismiss_pending_reminders(&self, opportunity_id: Uuid) -> AppResult<u64>;

    /// Atomically move up to `limit` pending jobs due at `now` to
    /// `dispatching` and return them, ordered by priority desc, relevance
    /// desc, then insertion order. A job is claimed by at most one caller.
    async fn claim_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<NotificationJob>>;

    /// Mark a claimed job as sent; `false` when it was not in `dispatching`.
    async fn mark_sent(&self, id: Uuid, delivered_at: DateTime<Utc>) -> AppResult<bool>;

    /// Mark a claimed job as failed with a reason; `false` when it was not
    /// in `dispatching`.
    async fn mark_failed(&self, id: Uuid, reason: &str) -> AppResult<bool>;

    /// All jobs of an opportunity in insertion order.
    async fn list_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<Vec<NotificationJob>>;
}

/// Registered push device tokens.
#[async_trait]
pub trait DeviceTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register (or re-activate and re-assign) a token.
    async fn register(
        &self,
        user_id: Uuid,
        token: &str,
        platform: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken>;

    /// Remove a user's token; returns whether it existed.
    async fn unregister(&self, user_id: Uuid, token: &str) -> AppResult<bool>;

    /// Active tokens of a user.
    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<DeviceToken>>;

    /// Mark a token inactive after the gateway rejected it as unregistered.
    async fn deactivate(&self, token: &str) -> AppResult<()>;

    /// Stamp a successful delivery.
    async fn touch(&self, token: &str, now: DateTime<Utc>) -> AppResult<()>;
}

/// Notification centre records.
#[async_trait]
pub trait DeliveryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a delivery record.
    async fn record(&self, record: &DeliveryRecord) -> AppResult<()>;

    /// Page through a user's records, newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DeliveryRecord>>;

    /// Mark a record read; returns false if the user has no such record.
    async fn mark_read(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Unread records for a user.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64>;
}

/// Engagement events.
#[async_trait]
pub trait EngagementStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an event.
    async fn record(&self, event: &EngagementEvent) -> AppResult<()>;

    /// View, save and application totals per opportunity for events
    /// recorded by `user_id` with `from < created_at <= to`. Opportunities
    /// without such events are absent.
    async fn counts_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<EngagementCounts>>;
}

/// Daily dispatch counters.
#[async_trait]
pub trait DispatchStatsStore: Send + Sync + std::fmt::Debug + 'static {
    /// Add to the counters of `day`, creating the row if needed.
    async fn increment(&self, day: NaiveDate, sent: u64, failed: u64) -> AppResult<()>;

    /// Counters of `day`, if any.
    async fn get(&self, day: NaiveDate) -> AppResult<Option<DailyDispatchStats>>;
}

/// Per-user viewing history.
#[async_trait]
pub trait ViewingHistoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a view.
    async fn record(&self, entry: &ViewingHistoryEntry) -> AppResult<()>;

    /// Most recent views, newest first.
    async fn recent_for_user(&self, user_id: Uuid, limit: u64)
    -> AppResult<Vec<ViewingHistoryEntry>>;

    /// Delete all of a user's views; returns how many were removed.
    async fn clear_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// Every store the services need, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Opportunities.
    pub opportunities: Arc<dyn OpportunityStore>,
    /// Status history.
    pub status_history: Arc<dyn StatusHistoryStore>,
    /// Notification jobs.
    pub jobs: Arc<dyn NotificationJobStore>,
    /// Device tokens.
    pub devices: Arc<dyn DeviceTokenStore>,
    /// Delivery records.
    pub deliveries: Arc<dyn DeliveryStore>,
    /// Engagement events.
    pub engagement: Arc<dyn EngagementStore>,
    /// Dispatch counters.
    pub dispatch_stats: Arc<dyn DispatchStatsStore>,
    /// Viewing history.
    pub viewing_history: Arc<dyn ViewingHistoryStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            opportunities: Arc::new(OpportunityRepository::new(pg.clone())),
            status_history: Arc::new(StatusHistoryRepository::new(pg.clone())),
            jobs: Arc::new(NotificationJobRepository::new(pg.clone())),
            devices: Arc::new(DeviceTokenRepository::new(pg.clone())),
            deliveries: Arc::new(DeliveryRepository::new(pg.clone())),
            engagement: Arc::new(EngagementRepository::new(pg.clone())),
            dispatch_stats: Arc::new(DispatchStatsRepository::new(pg.clone())),
            viewing_history: Arc::new(ViewingHistoryRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// In-process stores sharing one [`MemoryStore`].
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            opportunities: store.clone(),
            status_history: store.clone(),
            jobs: store.clone(),
            devices: store.clone(),
            deliveries: store.clone(),
            engagement: store.clone(),
            dispatch_stats: store.clone(),
            viewing_history: store,
            pool: None,
        }
    }

    /// The PostgreSQL pool, when running against the database.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}
