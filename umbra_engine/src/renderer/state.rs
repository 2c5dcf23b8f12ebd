/// Renderer lifecycle state machine
///
/// ```text
/// Uninitialized ──► Initialized ◄──► Resizing
///        │               │              │
///        └───────────────┴──────────────┴──► Shutdown
/// ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Constructed, no GPU resources yet
    Uninitialized,
    /// Swap chain and passes live, frames can be drawn
    Initialized,
    /// Swap-chain-dependent resources are being (or waiting to be) rebuilt
    Resizing,
    /// Every GPU resource released
    Shutdown,
}

impl RendererState {
    pub fn can_transition_to(self, next: RendererState) -> bool {
        use RendererState::*;
        matches!(
            (self, next),
            (Uninitialized, Initialized)
                | (Initialized, Resizing)
                | (Resizing, Initialized)
                | (Uninitialized, Shutdown)
                | (Initialized, Shutdown)
                | (Resizing, Shutdown)
        )
    }

    /// Whether GPU resources exist (possibly mid-resize)
    pub fn has_resources(self) -> bool {
        matches!(self, RendererState::Initialized | RendererState::Resizing)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
