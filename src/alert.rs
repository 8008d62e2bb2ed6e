//! Short-lived messages that tell the user how their last action went

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Local};

use crate::config::DEFAULT_ALERT_SECONDS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    level: AlertLevel,
    message: String,
    raised_at: DateTime<Local>,
}

impl Alert {
    pub fn new<S: ToString>(level: AlertLevel, message: S, raised_at: DateTime<Local>) -> Self {
        Self { level, message: message.to_string(), raised_at }
    }

    pub fn success<S: ToString>(message: S) -> Self {
        Self::new(AlertLevel::Success, message, Local::now())
    }

    pub fn danger<S: ToString>(message: S) -> Self {
        Self::new(AlertLevel::Danger, message, Local::now())
    }

    pub fn level(&self) -> AlertLevel           { self.level      }
    pub fn message(&self) -> &str               { &self.message   }
    pub fn raised_at(&self) -> &DateTime<Local> { &self.raised_at }

    pub fn is_expired_at(&self, now: &DateTime<Local>, lifetime: Duration) -> bool {
        *now - self.raised_at >= lifetime
    }
}

impl Display for Alert {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            AlertLevel::Success => "✓",
            AlertLevel::Danger => "✗",
        };
        write!(f, "{} {}", prefix, self.message)
    }
}


/// The alerts currently shown.
///
/// By default a new alert replaces the one being shown. Call `set_stacking(true)` to keep them all until they expire.
#[derive(Clone, Debug)]
pub struct Alerts {
    alerts: Vec<Alert>,
    lifetime: Duration,
    stacking: bool,
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_ALERT_SECONDS as i64))
    }
}

impl Alerts {
    pub fn new(lifetime: Duration) -> Self {
        Self { alerts: Vec::new(), lifetime, stacking: false }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn set_lifetime(&mut self, lifetime: Duration) {
        self.lifetime = lifetime;
    }

    pub fn set_stacking(&mut self, stacking: bool) {
        self.stacking = stacking;
    }

    pub fn push(&mut self, alert: Alert) {
        if self.stacking == false {
            self.alerts.clear();
        }
        self.alerts.push(alert);
    }

    /// Remove an alert before it expires. Returns `None` if there is no such alert.
    pub fn dismiss(&mut self, index: usize) -> Option<Alert> {
        if index < self.alerts.len() {
            Some(self.alerts.remove(index))
        } else {
            None
        }
    }

    /// Forget the expired alerts, and return the remaining ones
    pub fn active(&mut self, now: &DateTime<Local>) -> &[Alert] {
        let lifetime = self.lifetime;
        self.alerts.retain(|a| a.is_expired_at(now, lifetime) == false);
        &self.alerts
    }

    /// The most recent alert, expired or not
    pub fn last(&self) -> Option<&Alert> {
        self.alerts.last()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
