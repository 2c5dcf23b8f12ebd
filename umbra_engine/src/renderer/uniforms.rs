/// Uniform buffer layouts shared with the shaders (std140)
///
/// `CompositionUniforms` matches the `UBO` block of `composition.frag`,
/// `OffscreenUniforms` the `UBO` block of `gbuffer.vert`.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Number of point lights evaluated by the composition pass
pub const LIGHT_COUNT: usize = 6;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// w unused
    pub position: Vec4,
    pub color: Vec3,
    pub radius: f32,
}

/// What the composition pass writes to the swap image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugTarget {
    /// Lit result
    #[default]
    Composed,
    Position,
    Normal,
    Albedo,
}

impl DebugTarget {
    pub fn shader_value(self) -> i32 {
        match self {
            DebugTarget::Composed => 0,
            DebugTarget::Position => 1,
            DebugTarget::Normal => 2,
            DebugTarget::Albedo => 3,
        }
    }

    /// Cycle through the targets (demo key binding)
    pub fn next(self) -> Self {
        match self {
            DebugTarget::Composed => DebugTarget::Position,
            DebugTarget::Position => DebugTarget::Normal,
            DebugTarget::Normal => DebugTarget::Albedo,
            DebugTarget::Albedo => DebugTarget::Composed,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CompositionUniforms {
    pub lights: [PointLight; LIGHT_COUNT],
    pub view_pos: Vec4,
    pub debug_target: i32,
    pub _pad: [i32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OffscreenUniforms {
    pub projection: Mat4,
    pub view: Mat4,
}

/// Precomputed camera matrices handed over by the application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraMatrices {
    /// World-space eye position
    pub fn position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self {
            view: Mat4::look_at_rh(Vec3::new(0.0, 3.0, 8.0), Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 256.0),
        }
    }
}

impl OffscreenUniforms {
    pub fn from_camera(camera: &CameraMatrices) -> Self {
        Self {
            projection: camera.projection,
            view: camera.view,
        }
    }
}

const BASE_LIGHTS: [([f32; 3], [f32; 3], f32); LIGHT_COUNT] = [
    ([0.0, 0.0, 1.0], [1.5, 1.5, 1.5], 15.0),
    ([-2.0, 0.0, 0.0], [1.0, 0.0, 0.0], 15.0),
    ([2.0, 1.0, 0.0], [0.0, 0.0, 2.5], 5.0),
    ([0.0, 0.9, 0.5], [1.0, 1.0, 0.0], 2.0),
    ([0.0, 0.5, 0.0], [0.0, 1.0, 0.2], 5.0),
    ([0.0, 1.0, 0.0], [1.0, 0.7, 0.3], 25.0),
];

impl CompositionUniforms {
    /// Lights orbiting the origin; `timer` wraps at 1.0 for a full revolution
    pub fn animated(timer: f32, camera: &CameraMatrices, debug_target: DebugTarget) -> Self {
        let angle = timer * TAU;
        let (sin, cos) = angle.sin_cos();
        let lights = std::array::from_fn(|i| {
            let (position, color, radius) = BASE_LIGHTS[i];
            let mut position = Vec3::from(position);
            match i {
                0 => {
                    position.x = sin * 5.0;
                    position.z = cos * 5.0;
                }
                1 => {
                    position.x = -4.0 + sin * 2.0;
                    position.z = cos * 2.0;
                }
                2 => {
                    position.x = 4.0 + sin * 2.0;
                    position.z = cos * 2.0;
                }
                3 => position.z = sin * 4.0,
                4 => {
                    position.x = 2.0 + cos * 3.0;
                    position.z = sin * 3.0;
                }
                _ => {
                    position.x = -cos * 6.0;
                    position.z = -sin * 6.0;
                }
            }
            PointLight {
                position: position.extend(0.0),
                color: Vec3::from(color),
                radius,
            }
        });
        Self {
            lights,
            view_pos: camera.position().extend(0.0),
            debug_target: debug_target.shader_value(),
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
#[path = "uniforms_tests.rs"]
mod tests;
