//! Client-side render-mode change detection.

/// Global cable rendering mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Normal rendering.
    #[default]
    Standard,
    /// Cables rendered through obstructions.
    CableView,
}

/// Remembers the last observed [`RenderMode`] and reports changes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderWatcher {
    current: RenderMode,
}

impl RenderWatcher {
    /// Start in [`RenderMode::Standard`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed mode.
    pub fn current(&self) -> RenderMode {
        self.current
    }

    /// Record `mode`; returns `true` if it differs from the last one.
    pub fn observe(&mut self, mode: RenderMode) -> bool {
        if mode == self.current {
            return false;
        }
        self.current = mode;
        true
    }
}
