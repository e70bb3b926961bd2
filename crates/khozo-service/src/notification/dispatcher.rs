//! Batch delivery of due notification jobs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::config::NotificationConfig;
use khozo_core::result::AppResult;
use khozo_core::traits::{Clock, PushDelivery, PushGateway, PushMessage};
use khozo_database::store::{
    DeliveryStore, DeviceTokenStore, DispatchStatsStore, NotificationJobStore,
};
use khozo_entity::notification::{DeliveryRecord, NotificationJob};
use khozo_entity::opportunity::NotificationChannel;

/// Counts from one dispatch batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Jobs delivered.
    pub sent: usize,
    /// Jobs that failed.
    pub failed: usize,
}

impl DispatchSummary {
    /// Jobs processed in total.
    pub fn total(&self) -> usize {
        self.sent + self.failed
    }
}

/// Delivers due jobs through their channel.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    jobs: Arc<dyn NotificationJobStore>,
    devices: Arc<dyn DeviceTokenStore>,
    deliveries: Arc<dyn DeliveryStore>,
    stats: Arc<dyn DispatchStatsStore>,
    gateway: Arc<dyn PushGateway>,
    clock: Arc<dyn Clock>,
    config: NotificationConfig,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        jobs: Arc<dyn NotificationJobStore>,
        devices: Arc<dyn DeviceTokenStore>,
        deliveries: Arc<dyn DeliveryStore>,
        stats: Arc<dyn DispatchStatsStore>,
        gateway: Arc<dyn PushGateway>,
        clock: Arc<dyn Clock>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            jobs,
            devices,
            deliveries,
            stats,
            gateway,
            clock,
            config,
        }
    }

    /// Deliver up to `limit` due jobs, most urgent first.
    ///
    /// Jobs are claimed before delivery, so concurrent batches never share
    /// a job. A failing job never aborts the batch; only the initial claim
    /// can fail the call.
    pub async fn dispatch_batch(&self, limit: Option<usize>) -> AppResult<DispatchSummary> {
        let limit = self.effective_limit(limit);
        let now = self.clock.now();
        let claimed = self.jobs.claim_due(now, limit as u64).await?;
        if claimed.is_empty() {
            debug!("No notification jobs due");
            return Ok(DispatchSummary::default());
        }

        let mut summary = DispatchSummary::default();
        for job in &claimed {
            match self.deliver(job).await {
                Ok(()) => {
                    if self.complete(job).await {
                        summary.sent += 1;
                    }
                }
                Err(e) => {
                    warn!(job_id = %job.id, channel = %job.channel, error = %e, "Notification delivery failed");
                    match self.jobs.mark_failed(job.id, &e.message).await {
                        Ok(true) => summary.failed += 1,
                        Ok(false) => {
                            warn!(job_id = %job.id, "Job left dispatching before it was marked failed")
                        }
                        Err(store_err) => {
                            warn!(job_id = %job.id, error = %store_err, "Failed to mark job failed")
                        }
                    }
                }
            }
        }

        if let Err(e) = self
            .stats
            .increment(now.date_naive(), summary.sent as u64, summary.failed as u64)
            .await
        {
            warn!(error = %e, "Failed to update dispatch statistics");
        }

        info!(
            sent = summary.sent,
            failed = summary.failed,
            gateway = self.gateway.name(),
            "Dispatch batch finished"
        );
        Ok(summary)
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        let max = self.config.max_batch_limit.max(1);
        requested
            .unwrap_or(self.config.default_batch_limit)
            .clamp(1, max)
    }

    async fn deliver(&self, job: &NotificationJob) -> AppResult<()> {
        match job.channel {
            NotificationChannel::InApp => Ok(()),
            NotificationChannel::Push => self.deliver_push(job).await,
            NotificationChannel::Email => Err(AppError::no_delivery_target(
                "email delivery is not available",
            )),
        }
    }

    /// Send to every active device; one acceptance is enough.
    async fn deliver_push(&self, job: &NotificationJob) -> AppResult<()> {
        let tokens = self.devices.active_for_user(job.user_id).await?;
        if tokens.is_empty() {
            return Err(AppError::no_delivery_target("no delivery target"));
        }

        let message = PushMessage {
            title: job.title.clone(),
            body: job.body.clone(),
            data: serde_json::json!({
                "opportunity_id": job.opportunity_id,
                "job_id": job.id,
                "priority": job.priority,
            }),
        };

        let mut delivered = 0usize;
        let mut last_error = String::from("push delivery failed");
        for device in &tokens {
            match self.gateway.send(&device.token, &message).await {
                Ok(PushDelivery::Delivered) => {
                    delivered += 1;
                    if let Err(e) = self.devices.touch(&device.token, self.clock.now()).await {
                        warn!(device_id = %device.id, error = %e, "Failed to stamp device token");
                    }
                }
                Ok(PushDelivery::Rejected {
                    reason,
                    token_invalid,
                }) => {
                    if token_invalid {
                        info!(device_id = %device.id, "Deactivating unregistered device token");
                        if let Err(e) = self.devices.deactivate(&device.token).await {
                            warn!(device_id = %device.id, error = %e, "Failed to deactivate device token");
                        }
                    }
                    last_error = reason;
                }
                Err(e) => last_error = e.message,
            }
        }

        if delivered > 0 {
            Ok(())
        } else {
            Err(AppError::upstream(last_error))
        }
    }

    /// Mark the job sent and record the delivery; `false` when the job was
    /// no longer ours to settle.
    async fn complete(&self, job: &NotificationJob) -> bool {
        let now = self.clock.now();
        match self.jobs.mark_sent(job.id, now).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(job_id = %job.id, "Job left dispatching before it was marked sent");
                return false;
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Failed to mark job sent");
                return false;
            }
        }

        let record = DeliveryRecord {
            id: Uuid::new_v4(),
            job_id: job.id,
            user_id: job.user_id,
            opportunity_id: job.opportunity_id,
            channel: job.channel,
            title: job.title.clone(),
            body: job.body.clone(),
            delivered_at: now,
            read_at: None,
        };
        if let Err(e) = self.deliveries.record(&record).await {
            warn!(job_id = %job.id, error = %e, "Failed to write delivery record");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use khozo_entity::notification::NotificationJobStatus;
    use khozo_entity::opportunity::{Milestone, NotificationPreferences};

    use crate::testing::{Harness, create_input, date};

    async fn track(h: &Harness, channels: Vec<NotificationChannel>, days: Vec<u32>) -> Uuid {
        let mut input = create_input("SSC GD Constable");
        input.important_dates.application_end = Some(Milestone::verified(date(2025, 12, 1)));
        input.preferences = Some(NotificationPreferences {
            enabled: true,
            channels,
            days_before: days,
        });
        h.opportunities.create(&h.ctx, input).await.unwrap().id
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
    }

    #[tokio::test]
    async fn test_nothing_due_before_scheduled_time() {
        let h = Harness::at(2025, 11, 1);
        track(&h, vec![NotificationChannel::InApp], vec![7]).await;

        h.clock.set(at(2025, 11, 24, 3, 29));
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[tokio::test]
    async fn test_in_app_delivery_writes_record_and_stats() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::InApp], vec![7]).await;

        h.clock.set(at(2025, 11, 24, 3, 30));
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary, DispatchSummary { sent: 1, failed: 0 });

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        assert_eq!(jobs[0].status, NotificationJobStatus::Sent);
        assert_eq!(jobs[0].delivered_at, Some(at(2025, 11, 24, 3, 30)));

        let unread = h.centre.unread_count(&h.ctx).await.unwrap();
        assert_eq!(unread, 1);

        let stats = h.stores.dispatch_stats.get(date(2025, 11, 24)).await.unwrap().unwrap();
        assert_eq!((stats.sent, stats.failed), (1, 0));

        // Sent jobs are never picked up again.
        let again = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(again.total(), 0);
    }

    #[tokio::test]
    async fn test_push_without_tokens_fails_and_batch_continues() {
        let h = Harness::at(2025, 11, 1);
        let id = track(
            &h,
            vec![NotificationChannel::Push, NotificationChannel::InApp],
            vec![7],
        )
        .await;

        h.clock.set(at(2025, 11, 24, 4, 0));
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary, DispatchSummary { sent: 1, failed: 1 });

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        let push = jobs.iter().find(|j| j.channel == NotificationChannel::Push).unwrap();
        assert_eq!(push.status, NotificationJobStatus::Failed);
        assert_eq!(push.failure_reason.as_deref(), Some("no delivery target"));
        let in_app = jobs.iter().find(|j| j.channel == NotificationChannel::InApp).unwrap();
        assert_eq!(in_app.status, NotificationJobStatus::Sent);
    }

    #[tokio::test]
    async fn test_push_succeeds_when_any_token_accepts() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::Push], vec![3]).await;
        h.devices.register(&h.ctx, "stale-token", Some("android")).await.unwrap();
        h.devices.register(&h.ctx, "good-token", Some("web")).await.unwrap();
        h.gateway.reject("stale-token", "NotRegistered", true);

        h.clock.set(at(2025, 11, 28, 3, 30));
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary.sent, 1);

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        assert_eq!(jobs[0].status, NotificationJobStatus::Sent);
        assert_eq!(h.gateway.sent_to().len(), 2);

        let active = h.stores.devices.active_for_user(h.ctx.user_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, "good-token");
    }

    #[tokio::test]
    async fn test_push_rejected_everywhere_fails_with_gateway_reason() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::Push], vec![1]).await;
        h.devices.register(&h.ctx, "only-token", None).await.unwrap();
        h.gateway.reject("only-token", "InternalServerError", false);

        h.clock.set(at(2025, 11, 30, 3, 30));
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary.failed, 1);

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        assert_eq!(jobs[0].failure_reason.as_deref(), Some("InternalServerError"));
        // Not an invalid-token rejection, so the device stays active.
        let active = h.stores.devices.active_for_user(h.ctx.user_id).await.unwrap();
        assert_eq!(active.len(), 1);

        let stats = h.stores.dispatch_stats.get(date(2025, 11, 30)).await.unwrap().unwrap();
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_failed_jobs_are_not_retried() {
        let h = Harness::at(2025, 11, 1);
        track(&h, vec![NotificationChannel::Push], vec![7]).await;

        h.clock.set(at(2025, 11, 24, 3, 30));
        assert_eq!(h.dispatcher.dispatch_batch(None).await.unwrap().failed, 1);
        h.clock.advance(Duration::hours(1));
        assert_eq!(h.dispatcher.dispatch_batch(None).await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn test_batch_limit_takes_most_urgent_first() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::InApp], vec![7, 3, 1]).await;

        // Everything is overdue at once.
        h.clock.set(at(2025, 12, 1, 0, 0));
        let summary = h.dispatcher.dispatch_batch(Some(1)).await.unwrap();
        assert_eq!(summary.sent, 1);

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        let sent: Vec<_> = jobs
            .iter()
            .filter(|j| j.status == NotificationJobStatus::Sent)
            .collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].days_before, Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_batches_deliver_each_job_once() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::Push], vec![7]).await;
        h.devices.register(&h.ctx, "device-token", Some("android")).await.unwrap();

        h.clock.set(at(2025, 11, 24, 3, 30));
        let (a, b) = tokio::join!(
            h.dispatcher.dispatch_batch(None),
            h.dispatcher.dispatch_batch(None)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.sent + b.sent, 1);
        assert_eq!(a.failed + b.failed, 0);
        assert_eq!(h.gateway.sent_to(), vec!["device-token".to_string()]);

        let records = h.centre.unread_count(&h.ctx).await.unwrap();
        assert_eq!(records, 1);
        let stats = h.stores.dispatch_stats.get(date(2025, 11, 24)).await.unwrap().unwrap();
        assert_eq!((stats.sent, stats.failed), (1, 0));

        let jobs = h.stores.jobs.list_for_opportunity(id).await.unwrap();
        assert_eq!(jobs[0].status, NotificationJobStatus::Sent);
    }

    #[tokio::test]
    async fn test_claimed_job_survives_archive_and_is_delivered_once() {
        let h = Harness::at(2025, 11, 1);
        let id = track(&h, vec![NotificationChannel::InApp], vec![7]).await;

        h.clock.set(at(2025, 11, 24, 3, 30));
        let claimed = h.stores.jobs.claim_due(h.clock.now(), 10).await.unwrap();
        assert_eq!(claimed.len(), 1);

        // A claimed job is no longer pending, so archiving leaves it alone.
        h.lifecycle.transition(&h.ctx, id, "archived", None).await.unwrap();
        assert!(h.dispatcher.complete(&claimed[0]).await);
        assert!(!h.dispatcher.complete(&claimed[0]).await);
        assert_eq!(h.centre.unread_count(&h.ctx).await.unwrap(), 1);
        assert_eq!(h.dispatcher.dispatch_batch(None).await.unwrap().total(), 0);
    }

    #[test]
    fn test_effective_limit_is_clamped() {
        let h = Harness::at(2025, 11, 1);
        assert_eq!(h.dispatcher.effective_limit(None), 100);
        assert_eq!(h.dispatcher.effective_limit(Some(0)), 1);
        assert_eq!(h.dispatcher.effective_limit(Some(10_000)), 500);
    }
}
