//! Renderer configuration
//!
//! `Config` gathers every tunable the device, swap chain and frame loop read.
//! Built with `Config::default()` plus chained `with_*` setters.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::graphics_device::Extent2D;

/// Which validation messages the debug messenger forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Where validation messages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugOutput {
    Console,
    File(String),
    Both(String),
}

/// Category filter for validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: true,
            show_validation: true,
            show_performance: false,
        }
    }
}

/// Counters accumulated by the debug messenger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name (passed to the instance)
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Window extent requested at startup
    pub initial_extent: Extent2D,

    /// Enable validation layers + debug messenger (needs the `vulkan-validation` feature)
    pub enable_validation: bool,
    pub debug_severity: DebugSeverity,
    pub debug_output: DebugOutput,
    pub debug_message_filter: DebugMessageFilter,
    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,
    pub enable_validation_stats: bool,

    /// false allows IMMEDIATE presentation when MAILBOX is unavailable
    pub vsync: bool,
    /// Number of present-complete semaphores cycled by the frame loop
    pub frames_in_flight: usize,
    /// Directory holding `<name>.<stage>.spv` binaries
    pub shader_dir: PathBuf,
    /// Timeout for every fence wait, in nanoseconds
    pub fence_timeout_ns: u64,

    /// How many times a resize polls the window for a non-zero extent
    pub resize_poll_attempts: u32,
    /// Sleep between two resize polls
    pub resize_poll_interval: Duration,

    /// Clear colour of the composition target (linear RGBA)
    pub clear_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Umbra Application".to_string(),
            app_version: (1, 0, 0),
            initial_extent: Extent2D::new(1280, 720),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            debug_output: DebugOutput::Console,
            debug_message_filter: DebugMessageFilter::default(),
            break_on_validation_error: false,
            enable_validation_stats: true,
            vsync: true,
            frames_in_flight: 2,
            shader_dir: PathBuf::from("shaders"),
            fence_timeout_ns: 100_000_000_000,
            resize_poll_attempts: 50,
            resize_poll_interval: Duration::from_millis(10),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Config {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_initial_extent(mut self, width: u32, height: u32) -> Self {
        self.initial_extent = Extent2D::new(width, height);
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    pub fn with_debug_severity(mut self, severity: DebugSeverity) -> Self {
        self.debug_severity = severity;
        self
    }

    pub fn with_debug_output(mut self, output: DebugOutput) -> Self {
        self.debug_output = output;
        self
    }

    pub fn with_debug_message_filter(mut self, filter: DebugMessageFilter) -> Self {
        self.debug_message_filter = filter;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_frames_in_flight(mut self, frames: usize) -> Self {
        self.frames_in_flight = frames;
        self
    }

    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    pub fn with_fence_timeout_ns(mut self, timeout: u64) -> Self {
        self.fence_timeout_ns = timeout;
        self
    }

    pub fn with_resize_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.resize_poll_attempts = attempts;
        self.resize_poll_interval = interval;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Reject configurations the frame loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        if self.resize_poll_attempts == 0 {
            return Err(Error::InitializationFailed(
                "resize_poll_attempts must be at least 1".to_string(),
            ));
        }
        if self.fence_timeout_ns == 0 {
            return Err(Error::InitializationFailed(
                "fence_timeout_ns must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
