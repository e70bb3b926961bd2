//! Rendering of notification text and status-change notices.

use chrono::{DateTime, NaiveDate, Utc};

use khozo_entity::notification::{NewNotificationJob, NotificationPriority};
use khozo_entity::opportunity::{ApplicationStatus, Opportunity};

/// Title of a deadline reminder.
pub fn reminder_title(opportunity_title: &str, days_remaining: u32) -> String {
    match days_remaining {
        0 => format!("{opportunity_title}: deadline today"),
        1 => format!("{opportunity_title}: 1 day left"),
        n => format!("{opportunity_title}: {n} days left"),
    }
}

/// Body of a deadline reminder.
pub fn reminder_body(opportunity_title: &str, deadline: NaiveDate, days_remaining: u32) -> String {
    let when = deadline.format("%d %b %Y");
    match days_remaining {
        0 => format!("Today is the last date for {opportunity_title} ({when}). Apply now."),
        1 => format!("Only 1 day left for {opportunity_title}. The last date is {when}."),
        n => format!("{n} days left for {opportunity_title}. The last date is {when}."),
    }
}

/// Relevance of a reminder `days_remaining` before the deadline.
pub fn reminder_relevance(days_remaining: u32) -> f64 {
    1.0 / (f64::from(days_remaining) + 1.0)
}

/// Immediate, high-priority jobs announcing a significant status change.
///
/// Follows the opportunity's channel preferences; nothing is produced when
/// reminders are disabled or the status is not significant.
pub fn status_notice_jobs(
    opportunity: &Opportunity,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Vec<NewNotificationJob> {
    let prefs = &opportunity.preferences;
    if !status.is_significant() || !prefs.enabled {
        return Vec::new();
    }

    let title = format!("{}: {}", opportunity.title, status.label());
    let body = match status {
        ApplicationStatus::AdmitCardReleased => format!(
            "The admit card for {} is out. Download it before the exam.",
            opportunity.title
        ),
        ApplicationStatus::ResultReleased => {
            format!("Results for {} have been declared. Check your result now.", opportunity.title)
        }
        other => format!("{} is now {}.", opportunity.title, other.label()),
    };

    prefs
        .channels
        .iter()
        .filter(|channel| channel.is_deliverable())
        .map(|channel| NewNotificationJob {
            opportunity_id: opportunity.id,
            user_id: opportunity.user_id,
            channel: *channel,
            scheduled_for: now,
            priority: NotificationPriority::High,
            relevance_score: 1.0,
            title: title.clone(),
            body: body.clone(),
            days_before: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_title_pluralisation() {
        assert_eq!(reminder_title("NEET", 0), "NEET: deadline today");
        assert_eq!(reminder_title("NEET", 1), "NEET: 1 day left");
        assert_eq!(reminder_title("NEET", 7), "NEET: 7 days left");
    }

    #[test]
    fn test_reminder_body_mentions_date() {
        let body = reminder_body("NEET", NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(), 3);
        assert_eq!(body, "3 days left for NEET. The last date is 01 Dec 2025.");
    }

    #[test]
    fn test_relevance_decreases_with_distance() {
        assert_eq!(reminder_relevance(0), 1.0);
        assert_eq!(reminder_relevance(1), 0.5);
        assert!(reminder_relevance(7) < reminder_relevance(3));
    }
}
