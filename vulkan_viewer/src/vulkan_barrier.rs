/// Image layout transitions
///
/// Every image layout change in the renderer goes through this module: one
/// pipeline barrier per transition, with access masks derived from the
/// (old, new) layout pair. The GPU API does not track layouts, so the
/// `TrackedImage` wrapper carries an explicit layout tag that only
/// `transition()` is allowed to update.

use ash::vk;

/// Derive (src_access_mask, dst_access_mask) for an image layout transition.
///
/// Source access, by old layout:
/// - UNDEFINED: nothing to wait for (contents are discarded)
/// - PREINITIALIZED: host writes must land first
/// - TRANSFER_DST_OPTIMAL: transfer writes must land first
/// - COLOR_ATTACHMENT_OPTIMAL: color attachment writes must land first
/// - anything else: treated as already visible
///
/// Destination access, by new layout:
/// - TRANSFER_DST_OPTIMAL / PRESENT_SRC_KHR: transfer writes
/// - SHADER_READ_ONLY_OPTIMAL: shader reads; this transition is only valid
///   coming out of a transfer-destination state, so the source access is
///   forced to transfer-write
/// - COLOR_ATTACHMENT_OPTIMAL: color attachment reads
/// - DEPTH_STENCIL_ATTACHMENT_OPTIMAL: depth/stencil attachment writes
pub fn transition_masks(
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> (vk::AccessFlags, vk::AccessFlags) {
    let mut src_access = match old_layout {
        vk::ImageLayout::UNDEFINED => vk::AccessFlags::empty(),
        vk::ImageLayout::PREINITIALIZED => vk::AccessFlags::HOST_WRITE,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        _ => vk::AccessFlags::empty(),
    };

    let dst_access = match new_layout {
        vk::ImageLayout::TRANSFER_DST_OPTIMAL | vk::ImageLayout::PRESENT_SRC_KHR => {
            vk::AccessFlags::TRANSFER_WRITE
        }
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => {
            src_access = vk::AccessFlags::TRANSFER_WRITE;
            vk::AccessFlags::SHADER_READ
        }
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_READ,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        }
        _ => vk::AccessFlags::empty(),
    };

    (src_access, dst_access)
}

/// Record a layout transition into `command_buffer`.
///
/// Emits exactly one pipeline barrier. The command buffer must be in the
/// recording state; `old_layout` must be the image's true current layout
/// (or UNDEFINED when the contents are being discarded).
///
/// Both stage masks are TOP_OF_PIPE: coarse but always correct. Tightening
/// them to the producing/consuming stages is a local change to this
/// function if throughput ever matters.
///
/// # Safety
///
/// `command_buffer` must be recording and `image` must be a live image on
/// `device`.
pub unsafe fn set_image_layout(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    aspect_mask: vk::ImageAspectFlags,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    subresource_range: vk::ImageSubresourceRange,
) {
    let (src_access_mask, dst_access_mask) = transition_masks(old_layout, new_layout);

    let barrier = vk::ImageMemoryBarrier::default()
        .src_access_mask(src_access_mask)
        .dst_access_mask(dst_access_mask)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask,
            ..subresource_range
        });

    device.cmd_pipeline_barrier(
        command_buffer,
        vk::PipelineStageFlags::TOP_OF_PIPE,
        vk::PipelineStageFlags::TOP_OF_PIPE,
        vk::DependencyFlags::empty(),
        &[],
        &[],
        &[barrier],
    );
}

/// An image handle paired with its current layout.
///
/// The layout tag is updated only by `transition()`, so a stale caller
/// assumption shows up as a debug assertion instead of silent GPU misuse.
pub struct TrackedImage {
    image: vk::Image,
    layout: vk::ImageLayout,
}

impl TrackedImage {
    /// Wrap a freshly created image (layout UNDEFINED until transitioned).
    pub fn new(image: vk::Image) -> Self {
        Self {
            image,
            layout: vk::ImageLayout::UNDEFINED,
        }
    }

    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// The layout established by the most recent `transition()`.
    pub fn layout(&self) -> vk::ImageLayout {
        self.layout
    }

    /// Check the caller's old layout against the tag and move the tag to
    /// `new_layout`.
    ///
    /// Passing UNDEFINED as `old_layout` discards the contents and is always
    /// accepted; otherwise `old_layout` must match the tag. Pure bookkeeping,
    /// kept separate from the barrier recording so the guard is testable
    /// without a device.
    pub fn apply_transition(&mut self, old_layout: vk::ImageLayout, new_layout: vk::ImageLayout) {
        debug_assert!(
            old_layout == vk::ImageLayout::UNDEFINED || old_layout == self.layout,
            "layout transition from {:?} but image is in {:?}",
            old_layout,
            self.layout,
        );
        self.layout = new_layout;
    }

    /// Record a transition to `new_layout` and update the tag.
    ///
    /// The tag rules are those of [`TrackedImage::apply_transition`].
    ///
    /// # Safety
    ///
    /// Same contract as [`set_image_layout`].
    pub unsafe fn transition(
        &mut self,
        device: &ash::Device,
        command_buffer: vk::CommandBuffer,
        aspect_mask: vk::ImageAspectFlags,
        old_layout: vk::ImageLayout,
        new_layout: vk::ImageLayout,
        subresource_range: vk::ImageSubresourceRange,
    ) {
        self.apply_transition(old_layout, new_layout);
        set_image_layout(
            device,
            command_buffer,
            self.image,
            aspect_mask,
            old_layout,
            new_layout,
            subresource_range,
        );
    }
}
