//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use khozo_auth::{JwtDecoder, ServiceKeyVerifier};
use khozo_cache::CacheManager;
use khozo_core::config::AppConfig;
use khozo_core::result::AppResult;
use khozo_core::traits::{Clock, PushGateway};
use khozo_database::Stores;
use khozo_service::{
    DeviceService, EngagementService, LifecycleService, NotificationCentreService,
    NotificationDispatcher, NotificationScheduler, OpportunityService, RelatedService,
    TrendingService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store handles (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Cache manager
    pub cache: CacheManager,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Internal endpoint key check
    pub service_keys: Arc<ServiceKeyVerifier>,

    // ── Services ─────────────────────────────────────────────
    /// Opportunity tracking
    pub opportunity_service: Arc<OpportunityService>,
    /// Status transitions
    pub lifecycle_service: Arc<LifecycleService>,
    /// Reminder scheduling and preferences
    pub notification_scheduler: Arc<NotificationScheduler>,
    /// Due-job delivery
    pub notification_dispatcher: Arc<NotificationDispatcher>,
    /// Delivered notifications
    pub notification_centre: Arc<NotificationCentreService>,
    /// Push token registry
    pub device_service: Arc<DeviceService>,
    /// Related content
    pub related_service: Arc<RelatedService>,
    /// Trending lists
    pub trending_service: Arc<TrendingService>,
    /// Engagement tracking and viewing history
    pub engagement_service: Arc<EngagementService>,
}

impl AppState {
    /// Construct every service over the given stores, gateway and clock.
    pub fn build(
        config: AppConfig,
        stores: Stores,
        cache: CacheManager,
        gateway: Arc<dyn PushGateway>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let notification_scheduler = Arc::new(NotificationScheduler::new(
            stores.opportunities.clone(),
            stores.jobs.clone(),
            clock.clone(),
            &config.notification,
        )?);

        let opportunity_service = Arc::new(OpportunityService::new(
            stores.opportunities.clone(),
            Arc::clone(&notification_scheduler),
            clock.clone(),
        ));
        let lifecycle_service = Arc::new(LifecycleService::new(
            stores.opportunities.clone(),
            stores.status_history.clone(),
            stores.jobs.clone(),
            stores.engagement.clone(),
            clock.clone(),
            config.lifecycle.clone(),
        ));
        let notification_dispatcher = Arc::new(NotificationDispatcher::new(
            stores.jobs.clone(),
            stores.devices.clone(),
            stores.deliveries.clone(),
            stores.dispatch_stats.clone(),
            gateway,
            clock.clone(),
            config.notification.clone(),
        ));
        let notification_centre = Arc::new(NotificationCentreService::new(
            stores.deliveries.clone(),
            clock.clone(),
        ));
        let device_service = Arc::new(DeviceService::new(stores.devices.clone(), clock.clone()));
        let related_service = Arc::new(RelatedService::new(
            stores.opportunities.clone(),
            cache.clone(),
            config.related.clone(),
        ));
        let trending_service = Arc::new(TrendingService::new(
            stores.opportunities.clone(),
            stores.engagement.clone(),
            cache.clone(),
            clock.clone(),
            config.trending.clone(),
        ));
        let engagement_service = Arc::new(EngagementService::new(
            stores.opportunities.clone(),
            stores.engagement.clone(),
            stores.viewing_history.clone(),
            clock,
        ));

        Ok(Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            service_keys: Arc::new(ServiceKeyVerifier::new(&config.auth)),
            config: Arc::new(config),
            stores,
            cache,
            opportunity_service,
            lifecycle_service,
            notification_scheduler,
            notification_dispatcher,
            notification_centre,
            device_service,
            related_service,
            trending_service,
            engagement_service,
        })
    }
}
