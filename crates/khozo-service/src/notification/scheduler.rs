//! Reminder scheduling: preferences plus deadline become notification jobs.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::config::NotificationConfig;
use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_database::store::{NotificationJobStore, OpportunityStore};
use khozo_entity::notification::{NewNotificationJob, NotificationJob, NotificationPriority};
use khozo_entity::opportunity::{ApplicationStatus, NotificationPreferences, Opportunity};

use super::render;
use crate::context::RequestContext;
use crate::opportunity::load_owned;

/// What a scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    /// Pending reminders voided before rescheduling.
    pub dismissed: u64,
    /// Jobs created.
    pub created: usize,
}

/// Computes reminder times and enqueues jobs.
#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    opportunities: Arc<dyn OpportunityStore>,
    jobs: Arc<dyn NotificationJobStore>,
    clock: Arc<dyn Clock>,
    reminder_time: NaiveTime,
}

impl NotificationScheduler {
    /// Creates a new scheduler.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        jobs: Arc<dyn NotificationJobStore>,
        clock: Arc<dyn Clock>,
        config: &NotificationConfig,
    ) -> AppResult<Self> {
        let reminder_time =
            NaiveTime::from_hms_opt(config.reminder_hour_utc, config.reminder_minute_utc, 0)
                .ok_or_else(|| {
                    AppError::configuration(format!(
                        "Invalid reminder time {:02}:{:02}",
                        config.reminder_hour_utc, config.reminder_minute_utc
                    ))
                })?;
        Ok(Self {
            opportunities,
            jobs,
            clock,
            reminder_time,
        })
    }

    /// Owner-checked `schedule`.
    pub async fn schedule_for(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
    ) -> AppResult<ScheduleOutcome> {
        let opportunity = load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;
        self.schedule_opportunity(&opportunity).await
    }

    /// Void the opportunity's pending reminders and enqueue the set implied
    /// by its current preferences and deadline. Pending status notices are
    /// left alone.
    pub async fn schedule(&self, opportunity_id: Uuid) -> AppResult<ScheduleOutcome> {
        let opportunity = self
            .opportunities
            .find_by_id(opportunity_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Opportunity {opportunity_id} not found")))?;
        self.schedule_opportunity(&opportunity).await
    }

    /// The caller's stored preferences.
    pub async fn get_preferences(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
    ) -> AppResult<NotificationPreferences> {
        let opportunity = load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;
        Ok(opportunity.preferences)
    }

    /// Validate and persist new preferences, then reschedule.
    pub async fn update_preferences(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
        preferences: NotificationPreferences,
    ) -> AppResult<(NotificationPreferences, ScheduleOutcome)> {
        let preferences = preferences.checked()?;
        let mut opportunity = load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;

        self.opportunities
            .update_preferences(opportunity_id, &preferences, self.clock.now())
            .await?;
        opportunity.preferences = preferences.clone();

        info!(
            opportunity_id = %opportunity_id,
            enabled = preferences.enabled,
            days_before = ?preferences.days_before,
            "Notification preferences updated"
        );

        let outcome = self.schedule_opportunity(&opportunity).await?;
        Ok((preferences, outcome))
    }

    /// Every job of one of the caller's opportunities.
    pub async fn list_jobs(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
    ) -> AppResult<Vec<NotificationJob>> {
        load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;
        self.jobs.list_for_opportunity(opportunity_id).await
    }

    /// Re-run scheduling for every non-archived opportunity with a deadline.
    ///
    /// Failures are logged per opportunity; returns how many were rescheduled.
    pub async fn reschedule_all(&self) -> AppResult<usize> {
        let active = self.opportunities.list_active().await?;
        let mut rescheduled = 0;
        for opportunity in active.iter().filter(|o| o.deadline().is_some()) {
            match self.schedule_opportunity(opportunity).await {
                Ok(_) => rescheduled += 1,
                Err(e) => {
                    warn!(opportunity_id = %opportunity.id, error = %e, "Reschedule failed");
                }
            }
        }
        info!(rescheduled, "Reschedule pass finished");
        Ok(rescheduled)
    }

    async fn schedule_opportunity(&self, opportunity: &Opportunity) -> AppResult<ScheduleOutcome> {
        let dismissed = self
            .jobs
            .dismiss_pending_reminders(opportunity.id)
            .await?;

        let now = self.clock.now();
        let planned = self.plan(opportunity, now);
        let created = planned.len();
        for input in planned {
            self.jobs.create(&NotificationJob::from_new(input, now)).await?;
        }

        debug!(opportunity_id = %opportunity.id, dismissed, created, "Scheduling pass complete");
        Ok(ScheduleOutcome { dismissed, created })
    }

    /// Jobs implied by the opportunity's preferences at `now`.
    fn plan(&self, opportunity: &Opportunity, now: DateTime<Utc>) -> Vec<NewNotificationJob> {
        let prefs = opportunity.preferences.clone().normalized();
        if opportunity.status == ApplicationStatus::Archived
            || !prefs.enabled
            || prefs.days_before.is_empty()
        {
            return Vec::new();
        }
        let Some(deadline) = opportunity.deadline() else {
            return Vec::new();
        };

        let mut planned = Vec::new();
        for days in prefs.days_before.iter().copied() {
            let Some(fire_date) = deadline.checked_sub_days(Days::new(u64::from(days))) else {
                continue;
            };
            let scheduled_for = fire_date.and_time(self.reminder_time).and_utc();
            if scheduled_for < now {
                continue;
            }

            for channel in &prefs.channels {
                if !channel.is_deliverable() {
                    debug!(channel = %channel, "Channel not deliverable, skipping");
                    continue;
                }
                planned.push(NewNotificationJob {
                    opportunity_id: opportunity.id,
                    user_id: opportunity.user_id,
                    channel: *channel,
                    scheduled_for,
                    priority: NotificationPriority::for_days_remaining(days),
                    relevance_score: render::reminder_relevance(days),
                    title: render::reminder_title(&opportunity.title, days),
                    body: render::reminder_body(&opportunity.title, deadline, days),
                    days_before: Some(days as i32),
                });
            }
        }
        planned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use khozo_core::error::ErrorKind;
    use khozo_entity::notification::NotificationJobStatus;
    use khozo_entity::opportunity::{Milestone, NotificationChannel};

    use crate::testing::{Harness, create_input, date};

    async fn tracked(h: &Harness, deadline: NaiveDate, days: Vec<u32>) -> Opportunity {
        let mut input = create_input("SSC CHSL");
        input.important_dates.application_end = Some(Milestone::verified(deadline));
        input.preferences = Some(NotificationPreferences {
            enabled: true,
            channels: vec![NotificationChannel::InApp],
            days_before: days,
        });
        h.opportunities.create(&h.ctx, input).await.unwrap()
    }

    fn pending(jobs: &[NotificationJob]) -> Vec<&NotificationJob> {
        jobs.iter()
            .filter(|j| j.status == NotificationJobStatus::Pending)
            .collect()
    }

    #[tokio::test]
    async fn test_jobs_land_on_deadline_minus_offsets_at_reminder_time() {
        let h = Harness::at(2025, 11, 1);
        let opp = tracked(&h, date(2025, 12, 1), vec![1, 7, 3]).await;

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        let times: Vec<_> = jobs.iter().map(|j| j.scheduled_for).collect();
        assert_eq!(
            times,
            vec![
                Utc.with_ymd_and_hms(2025, 11, 24, 3, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 11, 28, 3, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 11, 30, 3, 30, 0).unwrap(),
            ]
        );
        assert_eq!(jobs[0].priority, NotificationPriority::Normal);
        assert_eq!(jobs[1].priority, NotificationPriority::High);
        assert_eq!(jobs[2].priority, NotificationPriority::Critical);
        assert_eq!(jobs[2].days_before, Some(1));
    }

    #[tokio::test]
    async fn test_past_reminders_are_not_created() {
        let h = Harness::at(2025, 11, 26);
        let opp = tracked(&h, date(2025, 12, 1), vec![7, 3, 1]).await;

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        let days: Vec<_> = jobs.iter().map(|j| j.days_before).collect();
        assert_eq!(days, vec![Some(3), Some(1)]);
    }

    #[tokio::test]
    async fn test_reschedule_twice_leaves_one_pending_job_per_offset_and_channel() {
        let h = Harness::at(2025, 11, 1);
        let mut input = create_input("RRB NTPC");
        input.important_dates.application_end = Some(Milestone::verified(date(2025, 12, 1)));
        let opp = h.opportunities.create(&h.ctx, input).await.unwrap();

        h.scheduler.schedule(opp.id).await.unwrap();
        let outcome = h.scheduler.schedule(opp.id).await.unwrap();
        assert_eq!(outcome.dismissed, 6);
        assert_eq!(outcome.created, 6);

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        let live = pending(&jobs);
        assert_eq!(live.len(), 6);
        let mut keys: Vec<_> = live.iter().map(|j| (j.days_before, j.channel)).collect();
        keys.sort_by_key(|(d, c)| (*d, c.as_str()));
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[tokio::test]
    async fn test_rescheduling_keeps_pending_status_notice() {
        let h = Harness::at(2025, 11, 1);
        let opp = tracked(&h, date(2025, 12, 1), vec![7]).await;
        h.lifecycle.transition(&h.ctx, opp.id, "applied", None).await.unwrap();
        h.lifecycle
            .transition(&h.ctx, opp.id, "admit_card_released", None)
            .await
            .unwrap();

        let (_, outcome) = h
            .scheduler
            .update_preferences(
                &h.ctx,
                opp.id,
                NotificationPreferences {
                    enabled: true,
                    channels: vec![NotificationChannel::InApp],
                    days_before: vec![3],
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, ScheduleOutcome { dismissed: 1, created: 1 });
        h.scheduler.reschedule_all().await.unwrap();

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        let notices: Vec<_> = jobs.iter().filter(|j| j.days_before.is_none()).collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].status, NotificationJobStatus::Pending);

        // Only the notice is due now; the 3-day reminder waits for 28 November.
        let summary = h.dispatcher.dispatch_batch(None).await.unwrap();
        assert_eq!(summary.sent, 1);
        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        let notice = jobs.iter().find(|j| j.days_before.is_none()).unwrap();
        assert_eq!(notice.status, NotificationJobStatus::Sent);
    }

    #[tokio::test]
    async fn test_disabled_or_empty_preferences_create_nothing() {
        let h = Harness::at(2025, 11, 1);
        let opp = tracked(&h, date(2025, 12, 1), vec![7]).await;

        let (_, outcome) = h
            .scheduler
            .update_preferences(
                &h.ctx,
                opp.id,
                NotificationPreferences {
                    enabled: false,
                    channels: vec![],
                    days_before: vec![7],
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, ScheduleOutcome { dismissed: 1, created: 0 });

        let (_, outcome) = h
            .scheduler
            .update_preferences(
                &h.ctx,
                opp.id,
                NotificationPreferences {
                    days_before: vec![],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.created, 0);
    }

    #[tokio::test]
    async fn test_missing_deadline_is_not_an_error() {
        let h = Harness::at(2025, 11, 1);
        let opp = h.opportunities.create(&h.ctx, create_input("PM Kisan")).await.unwrap();
        let outcome = h.scheduler.schedule(opp.id).await.unwrap();
        assert_eq!(outcome.created, 0);
    }

    #[tokio::test]
    async fn test_email_channel_is_inert() {
        let h = Harness::at(2025, 11, 1);
        let opp = tracked(&h, date(2025, 12, 1), vec![7]).await;
        let (prefs, outcome) = h
            .scheduler
            .update_preferences(
                &h.ctx,
                opp.id,
                NotificationPreferences {
                    enabled: true,
                    channels: vec![NotificationChannel::Email, NotificationChannel::Push],
                    days_before: vec![7, 7],
                },
            )
            .await
            .unwrap();
        assert_eq!(prefs.days_before, vec![7]);
        assert_eq!(outcome.created, 1);

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        assert_eq!(pending(&jobs)[0].channel, NotificationChannel::Push);
    }

    #[tokio::test]
    async fn test_update_preferences_validates_before_mutating() {
        let h = Harness::at(2025, 11, 1);
        let opp = tracked(&h, date(2025, 12, 1), vec![7]).await;
        let err = h
            .scheduler
            .update_preferences(
                &h.ctx,
                opp.id,
                NotificationPreferences {
                    days_before: vec![366],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let jobs = h.stores.jobs.list_for_opportunity(opp.id).await.unwrap();
        assert_eq!(pending(&jobs).len(), 1);
    }

    #[tokio::test]
    async fn test_reschedule_all_skips_archived_and_dateless() {
        let h = Harness::at(2025, 11, 1);
        let live = tracked(&h, date(2025, 12, 1), vec![7]).await;
        let archived = tracked(&h, date(2025, 12, 1), vec![7]).await;
        h.opportunities.create(&h.ctx, create_input("No dates")).await.unwrap();
        h.lifecycle
            .transition(&h.ctx, archived.id, "archived", None)
            .await
            .unwrap();

        assert_eq!(h.scheduler.reschedule_all().await.unwrap(), 1);
        let jobs = h.stores.jobs.list_for_opportunity(live.id).await.unwrap();
        assert_eq!(pending(&jobs).len(), 1);
        let jobs = h.stores.jobs.list_for_opportunity(archived.id).await.unwrap();
        assert!(pending(&jobs).is_empty());
    }
}
