/*!
# Umbra Engine

Backend-agnostic core of the Umbra deferred-shading renderer.

This crate provides the GPU vocabulary shared by every backend and the
frame orchestration built on top of it. Backends (Vulkan today) implement
`GraphicsDevice` with concrete associated types; the renderer is generic
over the device, so no downcasts happen at runtime.

## Architecture

- **GraphicsDevice**: Factory trait for swap chains, attachments, passes, buffers, pipelines, sync objects
- **Renderer**: Lifecycle and frame loop (acquire, render, present, resize)
- **RenderStrategy**: Pass-specific resources and submissions
- **DeferredStrategy**: G-buffer geometry pass + full-screen lighting composition
- **SceneData**: CPU-side vertices, indices, node hierarchy and materials
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod utils;
pub mod graphics_device;
pub mod scene;
pub mod renderer;

// Main umbra namespace module
pub mod umbra {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{
        Config, DebugMessageFilter, DebugOutput, DebugSeverity, ValidationStats,
    };

    // Frame orchestration
    pub use crate::renderer::{DeferredStrategy, FrameOutcome, Renderer, RendererState, RendererStats};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend-facing GPU vocabulary
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
