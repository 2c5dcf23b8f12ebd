/// Unit tests for MockGraphicsDevice
///
/// The orchestrator tests rely on the mock's bookkeeping (semaphore and
/// fence states, live objects), so that bookkeeping is checked here first.

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    AcquireOutcome, Attachment, AttachmentDesc, AttachmentRole, AttachmentSpec, Buffer, BufferDesc,
    BufferUsage, ClearValue, CommandList, DescriptorBinding, DescriptorSetLayoutDesc,
    DescriptorWrite, Extent2D, Format, GraphicsDevice, PassOutput, PipelineStageFlags,
    PresentOutcome, QueueFamilyIndices, Rect2D, RecordingState, RenderPassBegin, RenderPassDesc,
    RenderPassLayout, SharingMode, ShaderStageFlags, Submission, Swapchain,
};

fn present_layout() -> RenderPassLayout {
    RenderPassLayout::build(&RenderPassDesc {
        attachments: vec![
            AttachmentSpec::single(AttachmentRole::Framebuffer, Format::B8G8R8A8_SRGB),
            AttachmentSpec::single(AttachmentRole::Depth, Format::D32_SFLOAT_S8_UINT),
        ],
        subpass_count: 1,
        output: PassOutput::Present,
    })
    .unwrap()
}

fn recorded_list(device: &MockGraphicsDevice) -> MockCommandList {
    let mut lists = device.create_command_lists(1).unwrap();
    let mut cmd = lists.remove(0);
    cmd.begin().unwrap();
    cmd.end().unwrap();
    cmd
}

// ============================================================================
// SWAP CHAIN
// ============================================================================

#[test]
fn test_swapchain_follows_window_extent() {
    let device = MockGraphicsDevice::new();
    let swapchain = device.create_swapchain(Extent2D::new(800, 600), None).unwrap().unwrap();

    assert_eq!(swapchain.extent(), Extent2D::new(800, 600));
    assert_eq!(swapchain.image_count(), 3);
    assert_eq!(swapchain.format(), Format::B8G8R8A8_SRGB);
    assert!(swapchain.image_view(2).is_some());
    assert!(swapchain.image_view(3).is_none());
}

#[test]
fn test_swapchain_zero_extent_creates_nothing() {
    let device = MockGraphicsDevice::new();
    let probe = device.probe();

    assert!(device.create_swapchain(Extent2D::new(0, 600), None).unwrap().is_none());
    assert!(probe.swapchain_creations().is_empty());
    assert!(probe.live_objects().is_empty());
}

#[test]
fn test_swapchain_records_sharing_and_retired_chain() {
    let device = MockGraphicsDevice::new().with_queue_families(QueueFamilyIndices { graphics: 0, present: 1 });
    let probe = device.probe();

    let first = device.create_swapchain(Extent2D::new(640, 480), None).unwrap().unwrap();
    let second = device.create_swapchain(Extent2D::new(640, 480), Some(&first)).unwrap().unwrap();

    let creations = probe.swapchain_creations();
    assert_eq!(creations.len(), 2);
    match &creations[1] {
        MockEvent::CreateSwapchain { sharing_mode, queue_family_index_count, retired, .. } => {
            assert_eq!(*sharing_mode, SharingMode::Concurrent);
            assert_eq!(*queue_family_index_count, 2);
            assert_eq!(*retired, Some(first.handle.id()));
        }
        other => panic!("unexpected event {:?}", other),
    }
    drop(second);
}

#[test]
fn test_acquire_cycles_images_and_signals() {
    let device = MockGraphicsDevice::new();
    let mut swapchain = device.create_swapchain(Extent2D::new(64, 64), None).unwrap().unwrap();
    let semaphore = device.create_semaphore().unwrap();

    for expected in [0u32, 1, 2, 0] {
        let outcome = device.acquire_next_image(&mut swapchain, &semaphore).unwrap();
        assert_eq!(outcome, AcquireOutcome::Acquired { index: expected, suboptimal: false });
        assert_eq!(swapchain.current_image(), expected);
        device.present(&swapchain, expected, &semaphore).unwrap();
    }
}

#[test]
fn test_acquire_twice_into_same_semaphore_fails() {
    let device = MockGraphicsDevice::new();
    let mut swapchain = device.create_swapchain(Extent2D::new(64, 64), None).unwrap().unwrap();
    let semaphore = device.create_semaphore().unwrap();

    device.acquire_next_image(&mut swapchain, &semaphore).unwrap();
    assert!(device.acquire_next_image(&mut swapchain, &semaphore).is_err());
}

#[test]
fn test_scripted_acquire_and_present() {
    let device = MockGraphicsDevice::new();
    let probe = device.probe();
    let mut swapchain = device.create_swapchain(Extent2D::new(64, 64), None).unwrap().unwrap();
    let semaphore = device.create_semaphore().unwrap();

    probe.script_acquire(MockAcquire::OutOfDate);
    assert_eq!(device.acquire_next_image(&mut swapchain, &semaphore).unwrap(), AcquireOutcome::OutOfDate);

    probe.script_acquire(MockAcquire::Suboptimal);
    assert_eq!(
        device.acquire_next_image(&mut swapchain, &semaphore).unwrap(),
        AcquireOutcome::Acquired { index: 0, suboptimal: true }
    );

    probe.script_present(PresentOutcome::OutOfDate);
    assert_eq!(device.present(&swapchain, 0, &semaphore).unwrap(), PresentOutcome::OutOfDate);
}

#[test]
fn test_present_without_signal_fails() {
    let device = MockGraphicsDevice::new();
    let swapchain = device.create_swapchain(Extent2D::new(64, 64), None).unwrap().unwrap();
    let semaphore = device.create_semaphore().unwrap();

    assert!(device.present(&swapchain, 0, &semaphore).is_err());
}

// ============================================================================
// SUBMISSION / SYNC
// ============================================================================

#[test]
fn test_submit_requires_executable_list() {
    let device = MockGraphicsDevice::new();
    let mut lists = device.create_command_lists(1).unwrap();
    lists[0].begin().unwrap();

    assert!(device.submit(&Submission::<MockGraphicsDevice>::new(&lists[0])).is_err());
}

#[test]
fn test_submit_chains_semaphores() {
    let device = MockGraphicsDevice::new();
    let probe = device.probe();
    let first = recorded_list(&device);
    let second = recorded_list(&device);
    let semaphore = device.create_semaphore().unwrap();

    // Waiting before anything signaled is rejected
    let early = Submission::<MockGraphicsDevice>::new(&second).wait_on(&semaphore, PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
    assert!(device.submit(&early).is_err());

    device.submit(&Submission::<MockGraphicsDevice>::new(&first).signal(&semaphore)).unwrap();
    device
        .submit(&Submission::<MockGraphicsDevice>::new(&second).wait_on(&semaphore, PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT))
        .unwrap();

    let submissions = probe.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(
        submissions[1],
        MockEvent::Submit {
            command_list: second.handle.id(),
            wait: Some((semaphore.handle.id(), PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)),
            signal: None,
            fence: None,
        }
    );
}

#[test]
fn test_double_signal_fails() {
    let device = MockGraphicsDevice::new();
    let cmd = recorded_list(&device);
    let semaphore = device.create_semaphore().unwrap();

    device.submit(&Submission::<MockGraphicsDevice>::new(&cmd).signal(&semaphore)).unwrap();
    assert!(device.submit(&Submission::<MockGraphicsDevice>::new(&cmd).signal(&semaphore)).is_err());
}

#[test]
fn test_fence_lifecycle() {
    let device = MockGraphicsDevice::new();
    let mut cmd = recorded_list(&device);
    let fence = device.create_fence(true).unwrap();

    device.wait_for_fence(&fence, 1).unwrap();
    // Submitting with a signaled fence is invalid
    assert!(device.submit(&Submission::<MockGraphicsDevice>::new(&cmd).fence(&fence)).is_err());

    device.reset_fence(&fence).unwrap();
    assert!(matches!(device.wait_for_fence(&fence, 1), Err(Error::Timeout(_))));

    device.submit(&Submission::<MockGraphicsDevice>::new(&cmd).fence(&fence)).unwrap();
    assert!(device.reset_fence(&fence).is_err());
    assert!(cmd.begin().is_err());
    assert!(device.submit(&Submission::<MockGraphicsDevice>::new(&cmd)).is_err());

    device.wait_for_fence(&fence, 1).unwrap();
    cmd.begin().unwrap();
}

#[test]
fn test_wait_idle_completes_pending_fences() {
    let device = MockGraphicsDevice::new();
    let cmd = recorded_list(&device);
    let fence = device.create_fence(false).unwrap();

    device.submit(&Submission::<MockGraphicsDevice>::new(&cmd).fence(&fence)).unwrap();
    device.wait_idle().unwrap();
    device.reset_fence(&fence).unwrap();
}

// ============================================================================
// RESOURCES
// ============================================================================

#[test]
fn test_buffer_write_and_copy() {
    let device = MockGraphicsDevice::new();
    let staging = device.create_buffer(&BufferDesc::staging(8)).unwrap();
    let target = device.create_buffer(&BufferDesc::device_local(8, BufferUsage::VERTEX)).unwrap();

    staging.write(0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert!(staging.write(4, &[0; 8]).is_err());
    assert!(target.write(0, &[1]).is_err());

    device.copy_buffer(&staging, &target, 8).unwrap();
    assert_eq!(target.contents(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert!(device.copy_buffer(&target, &staging, 8).is_err());
}

#[test]
fn test_descriptor_update_checks_layout() {
    let device = MockGraphicsDevice::new();
    let layout = device
        .create_descriptor_set_layout(&DescriptorSetLayoutDesc::new(vec![DescriptorBinding::uniform_buffer(
            0,
            ShaderStageFlags::VERTEX,
        )]))
        .unwrap();
    let pool = device
        .create_descriptor_pool(&crate::graphics_device::plan_descriptor_pool(&[(&layout.desc, 1)]))
        .unwrap();
    let set = device.allocate_descriptor_set(&pool, &layout).unwrap();
    let ubo = device.create_buffer(&BufferDesc::uniform(64)).unwrap();

    let good = [DescriptorWrite::Buffer { binding: 0, buffer: &ubo, offset: 0, range: 64 }];
    device.update_descriptor_set(&set, &good).unwrap();

    let bad = [DescriptorWrite::Buffer { binding: 3, buffer: &ubo, offset: 0, range: 64 }];
    assert!(device.update_descriptor_set(&set, &bad).is_err());

    // Pool sized for exactly one set
    assert_eq!(device.allocate_descriptor_set(&pool, &layout).err(), Some(Error::OutOfMemory));
}

#[test]
fn test_framebuffer_view_count_must_match_pass() {
    let device = MockGraphicsDevice::new();
    let pass = device.create_render_pass(&present_layout()).unwrap();
    let depth = device
        .create_attachment(&AttachmentDesc {
            role: AttachmentRole::Depth,
            format: Format::D32_SFLOAT_S8_UINT,
            extent: Extent2D::new(32, 32),
        })
        .unwrap();

    assert!(device.create_framebuffer(&pass, &[depth.view()], Extent2D::new(32, 32)).is_err());
    let fb = device
        .create_framebuffer(&pass, &[MockImageView(999), depth.view()], Extent2D::new(32, 32))
        .unwrap();
    assert_eq!(fb.views.len(), 2);
}

#[test]
fn test_render_pass_begin_checks_clear_values() {
    let device = MockGraphicsDevice::new();
    let pass = device.create_render_pass(&present_layout()).unwrap();
    let fb = device
        .create_framebuffer(&pass, &[MockImageView(1), MockImageView(2)], Extent2D::new(32, 32))
        .unwrap();
    let mut cmd = device.create_command_lists(1).unwrap().remove(0);
    cmd.begin().unwrap();

    let short = RenderPassBegin::<MockGraphicsDevice> {
        render_pass: &pass,
        framebuffer: &fb,
        render_area: Rect2D::from_extent(Extent2D::new(32, 32)),
        clear_values: vec![ClearValue::Color([0.0; 4])],
    };
    assert!(cmd.begin_render_pass(&short).is_err());

    let full = RenderPassBegin::<MockGraphicsDevice> {
        clear_values: vec![ClearValue::Color([0.0; 4]), ClearValue::DepthStencil { depth: 1.0, stencil: 0 }],
        ..short
    };
    cmd.begin_render_pass(&full).unwrap();
    cmd.draw(3, 1, 0, 0).unwrap();
    cmd.end_render_pass().unwrap();
    cmd.end().unwrap();

    assert_eq!(cmd.recording_state(), RecordingState::Executable);
    assert_eq!(cmd.draw_count(), 1);
}

// ============================================================================
// LIVE OBJECTS
// ============================================================================

#[test]
fn test_dropped_objects_leave_live_table() {
    let device = MockGraphicsDevice::new();
    let probe = device.probe();

    let semaphore = device.create_semaphore().unwrap();
    let fence = device.create_fence(true).unwrap();
    let swapchain = device.create_swapchain(Extent2D::new(64, 64), None).unwrap().unwrap();
    assert_eq!(probe.live_objects(), vec!["Fence", "Semaphore", "Swapchain"]);

    drop(swapchain);
    drop(fence);
    drop(semaphore);
    assert!(probe.live_objects().is_empty());
    assert!(probe
        .events()
        .iter()
        .any(|e| matches!(e, MockEvent::Destroyed { kind: "Swapchain", .. })));
}
