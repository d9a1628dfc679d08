/// Frame scheduler - the per-frame acquire/submit/present cycle
///
/// Owns the semaphore pair that orders GPU work against presentation and the
/// per-swapchain-slot command buffers. Each displayed frame runs one cycle:
/// acquire an image index, submit that slot's pre-recorded command buffer,
/// queue the image for presentation.

use crate::error::{Error, Result};
use crate::vulkan_context::GpuContext;
use crate::vulkan_swapchain::{AcquireOutcome, PresentOutcome, Swapchain};
use crate::viewer_error;
use ash::vk;
use std::sync::Arc;

/// Outcome of one frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was submitted and queued for presentation.
    Presented,

    /// The surface is stale (out-of-date or suboptimal); the caller must run
    /// the resize path before the next frame. The frame itself is skipped,
    /// never treated as a failure.
    NeedsRebuild,
}

/// The two binary semaphores ordering one frame's GPU work.
///
/// "image acquired" is signaled by the platform when the acquired image
/// becomes writable and waited on by the submission at the
/// color-attachment-output stage. "render finished" is signaled by the
/// submission and waited on by the present operation.
pub struct FrameSyncPair {
    context: Arc<GpuContext>,
    pub image_acquired: vk::Semaphore,
    pub render_finished: vk::Semaphore,
}

impl FrameSyncPair {
    pub fn new(context: Arc<GpuContext>) -> Result<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        unsafe {
            let image_acquired = context
                .device
                .create_semaphore(&create_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::FrameSyncPair", "Failed to create semaphore: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;
            let render_finished = context
                .device
                .create_semaphore(&create_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::FrameSyncPair", "Failed to create semaphore: {:?}", e);
                    context.device.destroy_semaphore(image_acquired, None);
                    Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;
            Ok(Self {
                context,
                image_acquired,
                render_finished,
            })
        }
    }
}

impl Drop for FrameSyncPair {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();
            self.context.device.destroy_semaphore(self.image_acquired, None);
            self.context.device.destroy_semaphore(self.render_finished, None);
        }
    }
}

/// Per-frame scheduler: `Idle → Acquiring → Submitting → Presenting → Idle`.
///
/// A single semaphore pair is shared by all frames. That is only race-free
/// because this design keeps at most one frame in flight: frame N's present
/// waits on the same "render finished" semaphore that frame N's submission
/// signals, and no new submission is built until the next cycle. Raising the
/// frames-in-flight count requires a per-slot semaphore pool; the swapchain
/// side would not change.
pub struct FrameScheduler {
    context: Arc<GpuContext>,
    sync: FrameSyncPair,

    /// One command buffer per presentable image, pre-recorded and replayed.
    command_pool: vk::CommandPool,
    command_buffers: Vec<vk::CommandBuffer>,
}

impl FrameScheduler {
    pub fn new(context: Arc<GpuContext>) -> Result<Self> {
        let sync = FrameSyncPair::new(context.clone())?;

        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(context.graphics_queue_family);

        let command_pool = unsafe {
            context.device.create_command_pool(&pool_info, None).map_err(|e| {
                viewer_error!("viewer::FrameScheduler", "Failed to create command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
            })?
        };

        Ok(Self {
            context,
            sync,
            command_pool,
            command_buffers: Vec::new(),
        })
    }

    /// Allocate one command buffer per presentable image, releasing any
    /// previous batch first. Must be called whenever the swapchain image
    /// count may have changed.
    pub fn allocate_buffers(&mut self, image_count: usize) -> Result<()> {
        unsafe {
            if !self.command_buffers.is_empty() {
                self.context
                    .device
                    .free_command_buffers(self.command_pool, &self.command_buffers);
                self.command_buffers.clear();
            }

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(image_count as u32);

            self.command_buffers = self
                .context
                .device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| {
                    viewer_error!(
                        "viewer::FrameScheduler",
                        "Failed to allocate {} command buffers: {:?}",
                        image_count,
                        e
                    );
                    Error::InitializationFailed(format!(
                        "Failed to allocate command buffers: {:?}",
                        e
                    ))
                })?;
            Ok(())
        }
    }

    /// Record every slot's command buffer through `record`, which receives
    /// the recording buffer and its slot index.
    ///
    /// The drawing-command-buffer count equals the presentable-image count:
    /// each image may be in flight independently and replays its own buffer.
    pub fn record_all<F>(&self, mut record: F) -> Result<()>
    where
        F: FnMut(vk::CommandBuffer, usize) -> Result<()>,
    {
        for (slot, &cmd) in self.command_buffers.iter().enumerate() {
            unsafe {
                let begin_info = vk::CommandBufferBeginInfo::default();
                self.context
                    .device
                    .begin_command_buffer(cmd, &begin_info)
                    .map_err(|e| {
                        viewer_error!(
                            "viewer::FrameScheduler",
                            "Failed to begin command buffer for slot {}: {:?}",
                            slot,
                            e
                        );
                        Error::BackendError(format!("Failed to begin command buffer: {:?}", e))
                    })?;

                record(cmd, slot)?;

                self.context.device.end_command_buffer(cmd).map_err(|e| {
                    viewer_error!(
                        "viewer::FrameScheduler",
                        "Failed to end command buffer for slot {}: {:?}",
                        slot,
                        e
                    );
                    Error::BackendError(format!("Failed to end command buffer: {:?}", e))
                })?;
            }
        }
        Ok(())
    }

    /// Run one acquire → submit → present cycle against `swapchain`.
    ///
    /// The submission waits on "image acquired" at the
    /// color-attachment-output stage (not earlier: vertex work that does not
    /// touch the color attachment may overlap the acquisition), executes
    /// exactly the acquired slot's pre-recorded buffer, and signals "render
    /// finished", which presentation waits on.
    pub fn render_frame(&mut self, swapchain: &Swapchain) -> Result<FrameStatus> {
        let (image_index, suboptimal_acquire) =
            match swapchain.acquire_next(self.sync.image_acquired)? {
                AcquireOutcome::Ready { index, suboptimal } => (index, suboptimal),
                AcquireOutcome::OutOfDate => return Ok(FrameStatus::NeedsRebuild),
            };

        let slot = image_index as usize;
        if slot >= self.command_buffers.len() {
            viewer_error!(
                "viewer::FrameScheduler",
                "Acquired image index {} out of range (slots: {})",
                image_index,
                self.command_buffers.len()
            );
            return Err(Error::InvalidResource(format!(
                "Acquired image index {} out of range",
                image_index
            )));
        }

        let wait_semaphores = [self.sync.image_acquired];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.command_buffers[slot]];
        let signal_semaphores = [self.sync.render_finished];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.context
                .device
                .queue_submit(
                    self.context.graphics_queue,
                    &[submit_info],
                    vk::Fence::null(),
                )
                .map_err(|e| {
                    viewer_error!("viewer::FrameScheduler", "Queue submit failed: {:?}", e);
                    Error::BackendError(format!("Queue submit failed: {:?}", e))
                })?;
        }

        let outcome = swapchain.present(
            self.context.graphics_queue,
            image_index,
            self.sync.render_finished,
        )?;

        Ok(resolve_frame_status(suboptimal_acquire, outcome))
    }

    pub fn command_buffer_count(&self) -> usize {
        self.command_buffers.len()
    }
}

/// Fold the acquire and present signals into the frame's final status.
///
/// Suboptimal frames still display; they only schedule a rebuild for before
/// the next frame.
pub(crate) fn resolve_frame_status(
    suboptimal_acquire: bool,
    outcome: PresentOutcome,
) -> FrameStatus {
    match outcome {
        PresentOutcome::Presented if !suboptimal_acquire => FrameStatus::Presented,
        _ => FrameStatus::NeedsRebuild,
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();
            if !self.command_buffers.is_empty() {
                self.context
                    .device
                    .free_command_buffers(self.command_pool, &self.command_buffers);
            }
            self.context.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
