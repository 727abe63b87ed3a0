//! Session state: operating mode and per-mode HIT counters.

use hitdesk_marketplace::Environment;

/// Mutable, process-lifetime shell state. One counter per mode; only the
/// counter matching the active mode is ever displayed or adjusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    mode: Environment,
    sandbox_hits: u32,
    live_hits: u32,
}

impl Session {
    pub fn new(mode: Environment) -> Self {
        Self {
            mode,
            sandbox_hits: 0,
            live_hits: 0,
        }
    }

    /// Active operating mode.
    pub fn mode(&self) -> Environment {
        self.mode
    }

    /// Switch modes. The inactive mode's counter is left alone; each mode's
    /// count persists across toggles within the session.
    pub fn set_mode(&mut self, mode: Environment) {
        self.mode = mode;
    }

    /// Counter for the active mode.
    pub fn current_count(&self) -> u32 {
        match self.mode {
            Environment::Sandbox => self.sandbox_hits,
            Environment::Live => self.live_hits,
        }
    }

    /// Optimistically adjust the active mode's counter after a confirmed
    /// mutation. Decrements clamp at zero; the marketplace cannot hold a
    /// negative number of HITs, so a drifted counter pins at the floor
    /// until the next refresh.
    pub fn adjust_count(&mut self, delta: i32) {
        let counter = match self.mode {
            Environment::Sandbox => &mut self.sandbox_hits,
            Environment::Live => &mut self.live_hits,
        };
        *counter = counter.saturating_add_signed(delta);
    }

    /// Set the active mode's counter from a fresh `get_active_hits` query.
    /// An empty result is indistinguishable from a transient failure at the
    /// call sites that feed this, so it leaves the previous value in place
    /// rather than resetting to zero.
    pub fn refresh_counts<T>(&mut self, active_hits: &[T]) {
        if active_hits.is_empty() {
            return;
        }
        let count = active_hits.len() as u32;
        match self.mode {
            Environment::Sandbox => self.sandbox_hits = count,
            Environment::Live => self.live_hits = count,
        }
    }
}
