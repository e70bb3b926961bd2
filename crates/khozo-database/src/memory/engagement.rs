use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use khozo_core::result::AppResult;
use khozo_entity::engagement::{EngagementCounts, EngagementEvent, EngagementKind};
use khozo_entity::history::ViewingHistoryEntry;

use super::MemoryStore;
use crate::store::{EngagementStore, ViewingHistoryStore};

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn record(&self, event: &EngagementEvent) -> AppResult<()> {
        self.engagement.write().await.push(event.clone());
        Ok(())
    }

    async fn counts_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<EngagementCounts>> {
        let rows = self.engagement.read().await;
        let mut order: Vec<Uuid> = Vec::new();
        let mut counts: HashMap<Uuid, EngagementCounts> = HashMap::new();
        for event in rows
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| e.created_at > from && e.created_at <= to)
            .filter(|e| e.kind != EngagementKind::Share)
        {
            let entry = counts.entry(event.opportunity_id).or_insert_with(|| {
                order.push(event.opportunity_id);
                EngagementCounts {
                    opportunity_id: event.opportunity_id,
                    ..Default::default()
                }
            });
            match event.kind {
                EngagementKind::View => entry.views += 1,
                EngagementKind::Save => entry.saves += 1,
                EngagementKind::Application => entry.applications += 1,
                EngagementKind::Share => {}
            }
        }
        Ok(order.into_iter().filter_map(|id| counts.remove(&id)).collect())
    }
}

#[async_trait]
impl ViewingHistoryStore for MemoryStore {
    async fn record(&self, entry: &ViewingHistoryEntry) -> AppResult<()> {
        self.viewing_history.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<ViewingHistoryEntry>> {
        let rows = self.viewing_history.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn clear_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut rows = self.viewing_history.write().await;
        let before = rows.len();
        rows.retain(|e| e.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}
