//! Typed reminder preferences embedded on an opportunity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use khozo_core::AppError;

/// Largest accepted days-before offset.
pub const MAX_DAYS_BEFORE: u32 = 365;

/// Maximum number of distinct offsets.
pub const MAX_OFFSETS: usize = 10;

/// A notification delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Device push through the gateway.
    Push,
    /// In-app notification centre.
    InApp,
    /// Reserved; accepted in preferences but never scheduled.
    Email,
}

impl NotificationChannel {
    /// Return the channel as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::InApp => "in_app",
            Self::Email => "email",
        }
    }

    /// Whether jobs are actually created for this channel.
    pub fn is_deliverable(&self) -> bool {
        !matches!(self, Self::Email)
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationChannel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "in_app" | "in-app" | "inapp" => Ok(Self::InApp),
            "email" => Ok(Self::Email),
            _ => Err(AppError::validation(format!(
                "Invalid channel: '{s}'. Expected one of: push, in_app, email"
            ))),
        }
    }
}

/// Reminder preferences for one opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Master switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Channels to deliver on.
    #[serde(default = "default_channels")]
    pub channels: Vec<NotificationChannel>,
    /// Offsets, in days, before the deadline.
    #[serde(default = "default_days_before")]
    pub days_before: Vec<u32>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            channels: default_channels(),
            days_before: default_days_before(),
        }
    }
}

impl NotificationPreferences {
    /// Check the preferences against the accepted bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.days_before.len() > MAX_OFFSETS {
            return Err(AppError::validation(format!(
                "At most {MAX_OFFSETS} reminder offsets are allowed"
            )));
        }
        if let Some(bad) = self.days_before.iter().find(|d| **d > MAX_DAYS_BEFORE) {
            return Err(AppError::validation(format!(
                "Reminder offset {bad} is out of range 0..={MAX_DAYS_BEFORE}"
            )));
        }
        if self.enabled && self.channels.is_empty() {
            return Err(AppError::validation(
                "At least one channel is required while reminders are enabled",
            ));
        }
        Ok(())
    }

    /// Deduplicate channels and offsets; offsets are sorted descending.
    pub fn normalized(mut self) -> Self {
        self.days_before.sort_unstable_by(|a, b| b.cmp(a));
        self.days_before.dedup();
        let mut channels = Vec::with_capacity(self.channels.len());
        for channel in self.channels {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        self.channels = channels;
        self
    }

    /// Validate, then normalize.
    pub fn checked(self) -> Result<Self, AppError> {
        let normalized = self.normalized();
        normalized.validate()?;
        Ok(normalized)
    }
}

fn default_true() -> bool {
    true
}

fn default_channels() -> Vec<NotificationChannel> {
    vec![NotificationChannel::Push, NotificationChannel::InApp]
}

fn default_days_before() -> Vec<u32> {
    vec![7, 3, 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.enabled);
        assert_eq!(
            prefs.channels,
            vec![NotificationChannel::Push, NotificationChannel::InApp]
        );
        assert_eq!(prefs.days_before, vec![7, 3, 1]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"days_before":[1,7]}"#).expect("deserialize");
        assert!(prefs.enabled);
        assert_eq!(prefs.channels.len(), 2);
        assert_eq!(prefs.days_before, vec![1, 7]);
    }

    #[test]
    fn test_normalized_dedupes_and_sorts_descending() {
        let prefs = NotificationPreferences {
            enabled: true,
            channels: vec![NotificationChannel::InApp, NotificationChannel::InApp],
            days_before: vec![1, 7, 3, 7, 1],
        }
        .normalized();
        assert_eq!(prefs.days_before, vec![7, 3, 1]);
        assert_eq!(prefs.channels, vec![NotificationChannel::InApp]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_offset() {
        let prefs = NotificationPreferences {
            days_before: vec![400],
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_too_many_offsets() {
        let prefs = NotificationPreferences {
            days_before: (0..11).collect(),
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_enabled_without_channels_is_rejected_but_disabled_is_fine() {
        let mut prefs = NotificationPreferences {
            channels: vec![],
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
        prefs.enabled = false;
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_empty_offsets_are_valid() {
        let prefs = NotificationPreferences {
            days_before: vec![],
            ..Default::default()
        };
        assert!(prefs.checked().is_ok());
    }

    #[test]
    fn test_channel_parsing() {
        assert_eq!(
            "in-app".parse::<NotificationChannel>().expect("parse"),
            NotificationChannel::InApp
        );
        assert!("sms".parse::<NotificationChannel>().is_err());
        assert!(!NotificationChannel::Email.is_deliverable());
    }
}
