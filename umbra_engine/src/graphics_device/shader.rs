/// Shader binaries
///
/// Compiled SPIR-V lives at `<dir>/<name>.<stage>.spv`. A missing binary is
/// a broken build, so loading one aborts the process instead of returning.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::graphics_device::ShaderStageFlags;

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// File name infix (`gbuffer.vert.spv`)
    pub fn extension(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }

    pub fn flags(&self) -> ShaderStageFlags {
        match self {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
        }
    }
}

/// Descriptor for creating a shader module
#[derive(Debug, Clone)]
pub struct ShaderDesc<'a> {
    /// Name used in logs (`gbuffer`, `composition`)
    pub name: &'a str,
    pub stage: ShaderStage,
    /// SPIR-V words
    pub code: &'a [u32],
    pub entry_point: &'a str,
}

pub fn shader_path(dir: &Path, name: &str, stage: ShaderStage) -> PathBuf {
    dir.join(format!("{}.{}.spv", name, stage.extension()))
}

/// Reinterpret bytes as SPIR-V words, checking size and magic number
pub fn spirv_words(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(Error::InvalidResource(format!(
            "SPIR-V code size {} is not a non-zero multiple of 4",
            bytes.len()
        )));
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if words[0] != SPIRV_MAGIC {
        return Err(Error::InvalidResource(format!(
            "bad SPIR-V magic number {:#010x}",
            words[0]
        )));
    }

    Ok(words)
}

/// Load `<dir>/<name>.<stage>.spv`
///
/// A file that cannot be opened aborts the process. A file that opens but is
/// not SPIR-V is reported as `Error::InvalidResource`.
pub fn load_shader_code(dir: &Path, name: &str, stage: ShaderStage) -> Result<Vec<u32>> {
    let path = shader_path(dir, name, stage);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => crate::engine_fatal!(
            "umbra::Shader",
            "Cannot open shader binary {}: {}",
            path.display(),
            e
        ),
    };

    crate::engine_debug!("umbra::Shader", "Loaded {} ({} bytes)", path.display(), bytes.len());
    spirv_words(&bytes).map_err(|e| {
        crate::engine_error!("umbra::Shader", "{}: {}", path.display(), e);
        e
    })
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
