//! Alert lifecycle
//!
//! Handles:
//! - Gating new alerts on the global switch and snooze window
//! - Turning deviations into human-readable alerts
//! - Bounding retained history (newest first)
//! - Dismissal by alert id

use std::collections::VecDeque;

use super::{Deviation, Direction};
use crate::models::{AlertConfig, AnomalyEvent, Channel};

/// Default number of alerts retained
pub const DEFAULT_ALERT_RETENTION: usize = 50;

/// Message/suggestion pair for a deviation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertText {
    pub message: String,
    pub suggestion: String,
}

impl AlertText {
    /// Fixed lookup per channel; blink rate also keys on direction
    pub fn for_deviation(deviation: &Deviation) -> Self {
        let (message, suggestion) = match (deviation.channel, deviation.direction) {
            (Channel::BlinkRate, Direction::Above) => (
                format!(
                    "Increased blink rate detected ({:.1} blinks/min)",
                    deviation.value
                ),
                "Take a 20-second eye break. Look at something 20 feet away.",
            ),
            (Channel::BlinkRate, Direction::Below) => (
                format!(
                    "Decreased blink rate detected ({:.1} blinks/min)",
                    deviation.value
                ),
                "Remember to blink regularly. Try the 20-20-20 rule.",
            ),
            (Channel::EyeRedness, _) => (
                format!("High eye redness detected ({:.2})", deviation.value),
                "Your eyes may be strained. Reduce screen brightness and take a 5-minute break.",
            ),
            (Channel::Emotion, _) => (
                "Elevated stress or sadness levels detected".to_string(),
                "Consider taking a break. Try a 2-minute breathing exercise.",
            ),
            (Channel::Environmental, _) => (
                "Environmental factors outside normal range".to_string(),
                "Check room humidity and lighting conditions.",
            ),
        };

        Self {
            message,
            suggestion: suggestion.to_string(),
        }
    }
}

/// Bounded, newest-first alert list
#[derive(Debug, Clone)]
pub struct AlertManager {
    /// Index 0 is always the newest alert
    alerts: VecDeque<AnomalyEvent>,
    retention: usize,
    next_id: u64,
}

impl AlertManager {
    pub fn new(retention: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(retention.min(1024)),
            retention,
            next_id: 1,
        }
    }

    /// True when new alerts must not be created at `now`
    pub fn should_suppress(config: &AlertConfig, now: i64) -> bool {
        !config.enabled || config.is_snoozed(now)
    }

    /// Create an alert for a deviation, prepend it and trim history
    pub fn raise(&mut self, deviation: &Deviation, now: i64) -> AnomalyEvent {
        let text = AlertText::for_deviation(deviation);
        let event = AnomalyEvent {
            id: self.allocate_id(),
            timestamp: now,
            anomaly_type: deviation.channel,
            severity: deviation.severity,
            message: text.message,
            suggestion: text.suggestion,
        };
        self.insert(event.clone());
        event
    }

    /// Insert a pre-built alert (demo history) under a fresh id
    pub fn insert_with_new_id(&mut self, mut event: AnomalyEvent) -> AnomalyEvent {
        event.id = self.allocate_id();
        self.insert(event.clone());
        event
    }

    fn insert(&mut self, event: AnomalyEvent) {
        self.alerts.push_front(event);
        self.alerts.truncate(self.retention);
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Remove the alert with this id; returns whether one was removed
    pub fn dismiss(&mut self, id: u64) -> bool {
        match self.alerts.iter().position(|a| a.id == id) {
            Some(index) => {
                self.alerts.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u64) -> Option<&AnomalyEvent> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Newest first
    pub fn alerts(&self) -> Vec<AnomalyEvent> {
        self.alerts.iter().cloned().collect()
    }

    pub fn newest(&self) -> Option<&AnomalyEvent> {
        self.alerts.front()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_RETENTION)
    }
}
