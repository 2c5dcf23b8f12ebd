/// Command recording helpers and staged uploads
///
/// `record` and `record_render_pass_scoped` bracket a recording closure with
/// the matching begin/end calls, so a closure that fails leaves the command
/// list in a state the tracker will refuse to submit.

use bytemuck::Pod;

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, CommandList, Extent2D, GraphicsDevice, Rect2D,
    RenderPassBegin, Viewport,
};

/// begin → `f(cmd)` → end
pub fn record<D, F>(cmd: &mut D::CommandList, f: F) -> Result<()>
where
    D: GraphicsDevice,
    F: FnOnce(&mut D::CommandList) -> Result<()>,
{
    cmd.begin()?;
    f(cmd)?;
    cmd.end()
}

/// begin → begin render pass → `f(cmd)` → end render pass → end
pub fn record_render_pass_scoped<D, F>(
    cmd: &mut D::CommandList,
    begin: &RenderPassBegin<'_, D>,
    f: F,
) -> Result<()>
where
    D: GraphicsDevice,
    F: FnOnce(&mut D::CommandList) -> Result<()>,
{
    record::<D, _>(cmd, |cmd| {
        cmd.begin_render_pass(begin)?;
        f(cmd)?;
        cmd.end_render_pass()
    })
}

/// Dynamic viewport and scissor covering `extent`
pub fn set_full_viewport<D: GraphicsDevice>(cmd: &mut D::CommandList, extent: Extent2D) -> Result<()> {
    cmd.set_viewport(Viewport::from_extent(extent))?;
    cmd.set_scissor(Rect2D::from_extent(extent))
}

/// Upload `data` into a new device-local buffer through a staging buffer
///
/// Blocks until the copy completed; the staging buffer is gone on return.
pub fn upload_buffer<D: GraphicsDevice>(device: &D, data: &[u8], usage: BufferUsage) -> Result<D::Buffer> {
    let size = data.len() as u64;
    let staging = device.create_buffer(&BufferDesc::staging(size))?;
    staging.write(0, data)?;

    let buffer = device.create_buffer(&BufferDesc::device_local(size, usage))?;
    device.copy_buffer(&staging, &buffer, size)?;
    Ok(buffer)
}

/// Host-visible uniform buffer initialised with `value`
pub fn create_uniform_buffer<D: GraphicsDevice, T: Pod>(device: &D, value: &T) -> Result<D::Buffer> {
    let bytes = bytemuck::bytes_of(value);
    let buffer = device.create_buffer(&BufferDesc::uniform(bytes.len() as u64))?;
    buffer.write(0, bytes)?;
    Ok(buffer)
}

/// Overwrite a uniform buffer created by `create_uniform_buffer`
pub fn write_uniform<B: Buffer, T: Pod>(buffer: &B, value: &T) -> Result<()> {
    buffer.write(0, bytemuck::bytes_of(value))
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
