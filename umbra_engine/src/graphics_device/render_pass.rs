/// Render pass planning
///
/// Turns an ordered attachment list into the three pieces a backend needs to
/// create a render pass: attachment descriptions, subpass descriptions and
/// subpass dependencies. Pure data, no GPU calls.

use crate::error::{Error, Result};
use crate::graphics_device::{
    AccessFlags, AttachmentDescription, AttachmentRole, AttachmentSpec, ImageLayout,
    PipelineStageFlags,
};

/// Subpass index standing for "outside the render pass"
pub const SUBPASS_EXTERNAL: u32 = u32::MAX;

/// Reference from a subpass to an attachment index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentReference {
    pub attachment: u32,
    pub layout: ImageLayout,
}

/// Attachment references used by one subpass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubpassDescription {
    pub color: Vec<AttachmentReference>,
    pub depth: Option<AttachmentReference>,
    pub input: Vec<AttachmentReference>,
}

/// Execution + memory dependency between two subpasses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    pub src_subpass: u32,
    pub dst_subpass: u32,
    pub src_stage: PipelineStageFlags,
    pub dst_stage: PipelineStageFlags,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub by_region: bool,
}

/// Who consumes the pass output once it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutput {
    /// The presentation engine reads a swap chain image
    Present,
    /// A following pass samples the attachments in its fragment shader
    Sampled,
}

/// Declarative description of a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassDesc {
    pub attachments: Vec<AttachmentSpec>,
    pub subpass_count: u32,
    pub output: PassOutput,
}

/// Everything a backend needs to create the render pass object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassLayout {
    pub attachments: Vec<AttachmentDescription>,
    pub subpasses: Vec<SubpassDescription>,
    pub dependencies: Vec<SubpassDependency>,
}

impl RenderPassLayout {
    /// Validate the attachment list and resolve descriptions, subpasses and dependencies
    pub fn build(desc: &RenderPassDesc) -> Result<Self> {
        if desc.subpass_count == 0 || desc.subpass_count > 32 {
            return Err(Error::InvalidResource(format!(
                "render pass needs 1..=32 subpasses, got {}",
                desc.subpass_count
            )));
        }
        if desc.attachments.is_empty() {
            return Err(Error::InvalidResource("render pass without attachments".to_string()));
        }

        let framebuffer_count = desc
            .attachments
            .iter()
            .filter(|spec| spec.role == AttachmentRole::Framebuffer)
            .count();
        if framebuffer_count > 1 {
            return Err(Error::InvalidResource(format!(
                "render pass presents {} swap chain images, at most one allowed",
                framebuffer_count
            )));
        }

        for (index, spec) in desc.attachments.iter().enumerate() {
            spec.validate(index)?;
            if spec.subpasses.span() > desc.subpass_count {
                return Err(Error::InvalidResource(format!(
                    "attachment {} references subpass {} but the pass has {}",
                    index,
                    spec.subpasses.span() - 1,
                    desc.subpass_count
                )));
            }
        }

        Ok(Self {
            attachments: create_attachment_descriptions(&desc.attachments),
            subpasses: create_subpasses(&desc.attachments, desc.subpass_count)?,
            dependencies: create_dependencies(desc.subpass_count, desc.output),
        })
    }

    pub fn subpass_count(&self) -> u32 {
        self.subpasses.len() as u32
    }

    /// Colour references written by `subpass` (sizes the blend attachment array of its pipeline)
    pub fn color_attachment_count(&self, subpass: u32) -> usize {
        self.subpasses
            .get(subpass as usize)
            .map(|s| s.color.len())
            .unwrap_or(0)
    }
}

/// One description per attachment, in list order
pub fn create_attachment_descriptions(specs: &[AttachmentSpec]) -> Vec<AttachmentDescription> {
    specs.iter().map(AttachmentSpec::describe).collect()
}

/// Partition attachment references into colour / depth / input lists per subpass
pub fn create_subpasses(specs: &[AttachmentSpec], subpass_count: u32) -> Result<Vec<SubpassDescription>> {
    let mut subpasses = vec![SubpassDescription::default(); subpass_count as usize];

    for (index, spec) in specs.iter().enumerate() {
        let attachment = index as u32;
        let first_use = spec.subpasses.lowest();

        for subpass in spec.subpasses.iter().filter(|&s| s < subpass_count) {
            let target = &mut subpasses[subpass as usize];
            match spec.role {
                AttachmentRole::Framebuffer | AttachmentRole::Color => {
                    target.color.push(AttachmentReference {
                        attachment,
                        layout: ImageLayout::ColorAttachment,
                    });
                }
                AttachmentRole::Depth => {
                    if target.depth.is_some() {
                        return Err(Error::InvalidResource(format!(
                            "subpass {} has more than one depth attachment",
                            subpass
                        )));
                    }
                    target.depth = Some(AttachmentReference {
                        attachment,
                        layout: ImageLayout::DepthStencilAttachment,
                    });
                }
                AttachmentRole::Input => {
                    if Some(subpass) == first_use {
                        target.color.push(AttachmentReference {
                            attachment,
                            layout: ImageLayout::ColorAttachment,
                        });
                    } else {
                        target.input.push(AttachmentReference {
                            attachment,
                            layout: ImageLayout::ShaderReadOnly,
                        });
                    }
                }
            }
        }
    }

    Ok(subpasses)
}

/// External→first, first→…→last and last→external dependencies, all by-region
pub fn create_dependencies(subpass_count: u32, output: PassOutput) -> Vec<SubpassDependency> {
    let attachment_stages =
        PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | PipelineStageFlags::EARLY_FRAGMENT_TESTS;
    let attachment_writes =
        AccessFlags::COLOR_ATTACHMENT_WRITE | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;
    let last = subpass_count.saturating_sub(1);

    let mut dependencies = Vec::with_capacity(subpass_count as usize + 1);

    dependencies.push(match output {
        PassOutput::Present => SubpassDependency {
            src_subpass: SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage: PipelineStageFlags::BOTTOM_OF_PIPE,
            dst_stage: attachment_stages,
            src_access: AccessFlags::MEMORY_READ,
            dst_access: AccessFlags::COLOR_ATTACHMENT_READ | attachment_writes,
            by_region: true,
        },
        // The previous frame's composition may still sample the G-buffer
        PassOutput::Sampled => SubpassDependency {
            src_subpass: SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage: PipelineStageFlags::FRAGMENT_SHADER,
            dst_stage: attachment_stages,
            src_access: AccessFlags::SHADER_READ,
            dst_access: attachment_writes,
            by_region: true,
        },
    });

    for subpass in 0..last {
        dependencies.push(SubpassDependency {
            src_subpass: subpass,
            dst_subpass: subpass + 1,
            src_stage: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage: PipelineStageFlags::FRAGMENT_SHADER,
            src_access: AccessFlags::COLOR_ATTACHMENT_WRITE,
            dst_access: AccessFlags::INPUT_ATTACHMENT_READ,
            by_region: true,
        });
    }

    dependencies.push(match output {
        PassOutput::Present => SubpassDependency {
            src_subpass: last,
            dst_subpass: SUBPASS_EXTERNAL,
            src_stage: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage: PipelineStageFlags::BOTTOM_OF_PIPE,
            src_access: AccessFlags::COLOR_ATTACHMENT_READ | AccessFlags::COLOR_ATTACHMENT_WRITE,
            dst_access: AccessFlags::MEMORY_READ,
            by_region: true,
        },
        PassOutput::Sampled => SubpassDependency {
            src_subpass: last,
            dst_subpass: SUBPASS_EXTERNAL,
            src_stage: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage: PipelineStageFlags::FRAGMENT_SHADER,
            src_access: AccessFlags::COLOR_ATTACHMENT_WRITE,
            dst_access: AccessFlags::SHADER_READ,
            by_region: true,
        },
    });

    dependencies
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
