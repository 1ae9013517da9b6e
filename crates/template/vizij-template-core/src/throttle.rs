//! Rate-limited warnings for template keys that resolve to nothing.
//!
//! Each template family ("hovertemplate", "texttemplate", ...) owns one
//! [`WarningThrottle`]. The caller constructs it, keeps it for as long as
//! warnings should stay suppressed (usually the whole process) and passes it
//! to every formatting call of that family.

use serde::{Deserialize, Serialize};

/// Default number of per-key warnings before a family goes quiet.
pub const DEFAULT_MAX_WARNINGS: usize = 10;

/// Destination for template warnings.
pub trait WarningSink {
    fn warn(&self, message: &str);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warn(&self, message: &str) {
        log::warn!(target: "vizij_template", "{message}");
    }
}

impl<F> WarningSink for F
where
    F: Fn(&str),
{
    fn warn(&self, message: &str) {
        self(message)
    }
}

/// Saturating warning counter for one template family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningThrottle {
    pub name: String,
    pub max: usize,
    #[serde(default)]
    count: usize,
}

impl WarningThrottle {
    pub fn new(name: impl Into<String>, max: usize) -> Self {
        Self {
            name: name.into(),
            max,
            count: 0,
        }
    }

    pub fn hovertemplate() -> Self {
        Self::new("hovertemplate", DEFAULT_MAX_WARNINGS)
    }

    pub fn texttemplate() -> Self {
        Self::new("texttemplate", DEFAULT_MAX_WARNINGS)
    }

    /// Unresolved keys recorded so far, capped at `max + 1`.
    pub fn count(&self) -> usize {
        self.count
    }

    /// True once the suppression notice has been emitted.
    pub fn is_suppressed(&self) -> bool {
        self.count > self.max
    }

    /// Record one unresolved `key`.
    ///
    /// The first `max` misses warn about the key, the next one announces the
    /// suppression, and every later miss is silent.
    pub fn record_missing(&mut self, key: &str, sink: &dyn WarningSink) {
        if self.count < self.max {
            sink.warn(&format!(
                "Variable '{key}' in {} could not be found!",
                self.name
            ));
        } else if self.count == self.max {
            sink.warn(&format!(
                "Too many {} warnings - additional warnings will be suppressed",
                self.name
            ));
        } else {
            return;
        }
        self.count += 1;
    }
}
