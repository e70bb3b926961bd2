use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use khozo_core::result::AppResult;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_entity::notification::{
    DailyDispatchStats, DeliveryRecord, DeviceToken, NotificationJob, NotificationJobStatus,
};

use super::MemoryStore;
use crate::store::{DeliveryStore, DeviceTokenStore, DispatchStatsStore, NotificationJobStore};

#[async_trait]
impl NotificationJobStore for MemoryStore {
    async fn create(&self, job: &NotificationJob) -> AppResult<()> {
        self.jobs.write().await.push(job.clone());
        Ok(())
    }

    async fn dismiss_pending_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<u64> {
        let mut rows = self.jobs.write().await;
        let mut dismissed = 0;
        for job in rows.iter_mut().filter(|j| {
            j.opportunity_id == opportunity_id && j.status == NotificationJobStatus::Pending
        }) {
            job.status = NotificationJobStatus::Dismissed;
            dismissed += 1;
        }
        Ok(dismissed)
    }

    async fn dismiss_pending_reminders(&self, opportunity_id: Uuid) -> AppResult<u64> {
        let mut rows = self.jobs.write().await;
        let mut dismissed = 0;
        for job in rows.iter_mut().filter(|j| {
            j.opportunity_id == opportunity_id
                && j.status == NotificationJobStatus::Pending
                && j.days_before.is_some()
        }) {
            job.status = NotificationJobStatus::Dismissed;
            dismissed += 1;
        }
        Ok(dismissed)
    }

    async fn claim_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<NotificationJob>> {
        // One write lock covers selection and the status flip.
        let mut rows = self.jobs.write().await;
        let mut due: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, j)| j.is_due(now))
            .map(|(i, _)| i)
            .collect();
        // Stable sort keeps insertion order for equal keys.
        due.sort_by(|&a, &b| {
            rows[b]
                .priority
                .cmp(&rows[a].priority)
                .then_with(|| rows[b].relevance_score.total_cmp(&rows[a].relevance_score))
        });
        due.truncate(limit as usize);

        let mut claimed = Vec::with_capacity(due.len());
        for i in due {
            rows[i].status = NotificationJobStatus::Dispatching;
            claimed.push(rows[i].clone());
        }
        Ok(claimed)
    }

    async fn mark_sent(&self, id: Uuid, delivered_at: DateTime<Utc>) -> AppResult<bool> {
        let mut rows = self.jobs.write().await;
        match rows
            .iter_mut()
            .find(|j| j.id == id && j.status == NotificationJobStatus::Dispatching)
        {
            Some(job) => {
                job.status = NotificationJobStatus::Sent;
                job.delivered_at = Some(delivered_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> AppResult<bool> {
        let mut rows = self.jobs.write().await;
        match rows
            .iter_mut()
            .find(|j| j.id == id && j.status == NotificationJobStatus::Dispatching)
        {
            Some(job) => {
                job.status = NotificationJobStatus::Failed;
                job.failure_reason = Some(reason.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<Vec<NotificationJob>> {
        let rows = self.jobs.read().await;
        Ok(rows
            .iter()
            .filter(|j| j.opportunity_id == opportunity_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DeviceTokenStore for MemoryStore {
    async fn register(
        &self,
        user_id: Uuid,
        token: &str,
        platform: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken> {
        let mut rows = self.devices.write().await;
        if let Some(existing) = rows.iter_mut().find(|d| d.token == token) {
            existing.user_id = user_id;
            existing.platform = platform.map(str::to_string);
            existing.is_active = true;
            return Ok(existing.clone());
        }
        let device = DeviceToken {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            platform: platform.map(str::to_string),
            is_active: true,
            created_at: now,
            last_used_at: None,
        };
        rows.push(device.clone());
        Ok(device)
    }

    async fn unregister(&self, user_id: Uuid, token: &str) -> AppResult<bool> {
        let mut rows = self.devices.write().await;
        let before = rows.len();
        rows.retain(|d| !(d.user_id == user_id && d.token == token));
        Ok(rows.len() < before)
    }

    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<DeviceToken>> {
        let rows = self.devices.read().await;
        Ok(rows
            .iter()
            .filter(|d| d.user_id == user_id && d.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate(&self, token: &str) -> AppResult<()> {
        let mut rows = self.devices.write().await;
        if let Some(device) = rows.iter_mut().find(|d| d.token == token) {
            device.is_active = false;
        }
        Ok(())
    }

    async fn touch(&self, token: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut rows = self.devices.write().await;
        if let Some(device) = rows.iter_mut().find(|d| d.token == token) {
            device.last_used_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn record(&self, record: &DeliveryRecord) -> AppResult<()> {
        self.deliveries.write().await.push(record.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DeliveryRecord>> {
        let rows = self.deliveries.read().await;
        let mut owned: Vec<&DeliveryRecord> = rows.iter().filter(|r| r.user_id == user_id).collect();
        owned.sort_by(|a, b| b.delivered_at.cmp(&a.delivered_at));
        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut rows = self.deliveries.write().await;
        match rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) {
            Some(record) => {
                record.read_at.get_or_insert(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        let rows = self.deliveries.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && !r.is_read())
            .count() as u64)
    }
}

#[async_trait]
impl DispatchStatsStore for MemoryStore {
    async fn increment(&self, day: NaiveDate, sent: u64, failed: u64) -> AppResult<()> {
        let mut rows = self.dispatch_stats.write().await;
        let entry = rows.entry(day).or_insert(DailyDispatchStats {
            day,
            sent: 0,
            failed: 0,
        });
        entry.sent += sent as i64;
        entry.failed += failed as i64;
        Ok(())
    }

    async fn get(&self, day: NaiveDate) -> AppResult<Option<DailyDispatchStats>> {
        Ok(self.dispatch_stats.read().await.get(&day).copied())
    }
}
