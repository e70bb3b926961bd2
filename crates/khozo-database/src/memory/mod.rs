//! In-process implementation of every store trait.
//!
//! Rows live in insertion-ordered vectors behind `tokio` read-write locks,
//! so iteration order matches the `seq` / `created_at` ordering of the
//! PostgreSQL repositories.

mod engagement;
mod notification;
mod opportunity;

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use khozo_entity::engagement::EngagementEvent;
use khozo_entity::history::{StatusHistoryEntry, ViewingHistoryEntry};
use khozo_entity::notification::{
    DailyDispatchStats, DeliveryRecord, DeviceToken, NotificationJob,
};
use khozo_entity::opportunity::Opportunity;

/// Shared in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    opportunities: RwLock<Vec<Opportunity>>,
    status_history: RwLock<Vec<StatusHistoryEntry>>,
    jobs: RwLock<Vec<NotificationJob>>,
    devices: RwLock<Vec<DeviceToken>>,
    deliveries: RwLock<Vec<DeliveryRecord>>,
    engagement: RwLock<Vec<EngagementEvent>>,
    dispatch_stats: RwLock<HashMap<NaiveDate, DailyDispatchStats>>,
    viewing_history: RwLock<Vec<ViewingHistoryEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}
