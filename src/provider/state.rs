use crate::services::api::DashboardSnapshot;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPhase {
    Idle,
    Loading,
    Ready,
    Empty,
    TornDown,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    phase: ProviderPhase,
    snapshot: Option<DashboardSnapshot>,
    last_updated: Option<Instant>,
    last_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            phase: ProviderPhase::Idle,
            snapshot: None,
            last_updated: None,
            last_error: None,
        }
    }

    pub fn set_loading(&mut self) {
        self.phase = ProviderPhase::Loading;
        self.last_error = None;
    }

    pub fn update(&mut self, snapshot: DashboardSnapshot) {
        self.phase = ProviderPhase::Ready;
        self.snapshot = Some(snapshot);
        self.last_updated = Some(Instant::now());
        self.last_error = None;
    }

    pub fn set_empty(&mut self, error: Option<String>) {
        self.phase = ProviderPhase::Empty;
        self.snapshot = None;
        self.last_error = error;
    }

    pub fn tear_down(&mut self) {
        self.phase = ProviderPhase::TornDown;
        self.snapshot = None;
    }

    pub fn phase(&self) -> ProviderPhase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ProviderPhase::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ProviderPhase::Ready
    }

    pub fn is_empty(&self) -> bool {
        self.phase == ProviderPhase::Empty
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == ProviderPhase::TornDown
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let state = DashboardState::new();
        assert_eq!(state.phase(), ProviderPhase::Idle);
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn loading_keeps_previous_snapshot() {
        let mut state = DashboardState::new();
        state.update(DashboardSnapshot::default());
        state.set_loading();

        assert!(state.is_loading());
        assert!(state.snapshot().is_some());
    }

    #[test]
    fn empty_clears_snapshot_and_records_error() {
        let mut state = DashboardState::new();
        state.update(DashboardSnapshot::default());
        state.set_empty(Some("request error".into()));

        assert!(state.is_empty());
        assert!(state.snapshot().is_none());
        assert_eq!(state.last_error(), Some("request error"));
    }

    #[test]
    fn tear_down_is_terminal() {
        let mut state = DashboardState::new();
        state.update(DashboardSnapshot::default());
        state.tear_down();

        assert!(state.is_torn_down());
        assert!(state.snapshot().is_none());
    }
}
