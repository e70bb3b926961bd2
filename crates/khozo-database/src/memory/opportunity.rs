use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::result::AppResult;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_entity::engagement::EngagementKind;
use khozo_entity::history::StatusHistoryEntry;
use khozo_entity::opportunity::{
    ApplicationStatus, NotificationPreferences, Opportunity, OpportunityKind,
};

use super::MemoryStore;
use crate::store::{OpportunityStore, StatusHistoryStore};

fn missing(id: Uuid) -> AppError {
    AppError::not_found(format!("Opportunity {id} not found"))
}

#[async_trait]
impl OpportunityStore for MemoryStore {
    async fn insert(&self, opportunity: &Opportunity) -> AppResult<()> {
        let mut rows = self.opportunities.write().await;
        if rows.iter().any(|o| o.id == opportunity.id) {
            return Err(AppError::database(format!(
                "Opportunity {} already exists",
                opportunity.id
            )));
        }
        rows.push(opportunity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Opportunity>> {
        let rows = self.opportunities.read().await;
        Ok(rows.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Opportunity>> {
        let rows = self.opportunities.read().await;
        Ok(rows.iter().filter(|o| ids.contains(&o.id)).cloned().collect())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Opportunity>> {
        let rows = self.opportunities.read().await;
        let owned: Vec<&Opportunity> = rows.iter().rev().filter(|o| o.user_id == user_id).collect();
        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut rows = self.opportunities.write().await;
        let row = rows.iter_mut().find(|o| o.id == id).ok_or_else(|| missing(id))?;
        row.status = status;
        row.updated_at = now;
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut rows = self.opportunities.write().await;
        let row = rows.iter_mut().find(|o| o.id == id).ok_or_else(|| missing(id))?;
        row.preferences = preferences.clone();
        row.updated_at = now;
        Ok(())
    }

    async fn increment_counter(&self, id: Uuid, kind: EngagementKind) -> AppResult<()> {
        let mut rows = self.opportunities.write().await;
        if let Some(row) = rows.iter_mut().find(|o| o.id == id) {
            match kind {
                EngagementKind::View => row.view_count += 1,
                EngagementKind::Save => row.save_count += 1,
                EngagementKind::Share => row.share_count += 1,
                EngagementKind::Application => {}
            }
        }
        Ok(())
    }

    async fn list_candidates(
        &self,
        user_id: Uuid,
        exclude_id: Uuid,
        kinds: Option<&[OpportunityKind]>,
        limit: u64,
    ) -> AppResult<Vec<Opportunity>> {
        let rows = self.opportunities.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id && o.id != exclude_id)
            .filter(|o| kinds.is_none_or(|k| k.contains(&o.kind)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_active(&self) -> AppResult<Vec<Opportunity>> {
        let rows = self.opportunities.read().await;
        Ok(rows
            .iter()
            .filter(|o| o.status != ApplicationStatus::Archived)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatusHistoryStore for MemoryStore {
    async fn append(&self, entry: &StatusHistoryEntry) -> AppResult<()> {
        self.status_history.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_for_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> AppResult<Vec<StatusHistoryEntry>> {
        let rows = self.status_history.read().await;
        Ok(rows
            .iter()
            .filter(|e| e.opportunity_id == opportunity_id)
            .cloned()
            .collect())
    }
}
