/// Graphics pipeline for the textured cube
///
/// Fixed-function state with dynamic viewport/scissor so the pipeline
/// itself survives window resizes only through the coordinated rebuild
/// (the render pass it bakes in is extent-independent, but the rebuild
/// path recreates it wholesale for simplicity).

use crate::error::{Error, Result};
use crate::vulkan_context::GpuContext;
use crate::vulkan_shader::ShaderPair;
use crate::viewer_error;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;

/// Cube vertex: clip-friendly position plus texture coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32A32_SFLOAT,
                offset: 0,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: 16,
            },
        ]
    }
}

/// Pipeline cache plus the one graphics pipeline.
pub struct Pipeline {
    context: Arc<GpuContext>,
    cache: vk::PipelineCache,
    pub pipeline: vk::Pipeline,
}

impl Pipeline {
    pub fn new(
        context: Arc<GpuContext>,
        shaders: &ShaderPair,
        pipeline_layout: vk::PipelineLayout,
        render_pass: vk::RenderPass,
    ) -> Result<Self> {
        unsafe {
            let cache = context
                .device
                .create_pipeline_cache(&vk::PipelineCacheCreateInfo::default(), None)
                .map_err(|e| {
                    viewer_error!("viewer::Pipeline", "Failed to create pipeline cache: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create pipeline cache: {:?}", e))
                })?;

            let entry = c"main";
            let stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(shaders.vertex)
                    .name(entry),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(shaders.fragment)
                    .name(entry),
            ];

            let binding_descriptions = [Vertex::binding_description()];
            let attribute_descriptions = Vertex::attribute_descriptions();
            let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&binding_descriptions)
                .vertex_attribute_descriptions(&attribute_descriptions);

            let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

            // Set per frame, so resize never invalidates the pipeline state
            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state =
                vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
                .polygon_mode(vk::PolygonMode::FILL)
                .cull_mode(vk::CullModeFlags::NONE)
                .front_face(vk::FrontFace::CLOCKWISE)
                .line_width(1.0);

            let multisample = vk::PipelineMultisampleStateCreateInfo::default()
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(true)
                .depth_write_enable(true)
                .depth_compare_op(vk::CompareOp::LESS_OR_EQUAL);

            let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
                .blend_enable(false)
                .color_write_mask(vk::ColorComponentFlags::RGBA)];
            let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
                .attachments(&blend_attachments);

            let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .vertex_input_state(&vertex_input)
                .input_assembly_state(&input_assembly)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization)
                .multisample_state(&multisample)
                .depth_stencil_state(&depth_stencil)
                .color_blend_state(&color_blend)
                .dynamic_state(&dynamic_state)
                .layout(pipeline_layout)
                .render_pass(render_pass)
                .subpass(0);

            let pipelines = context
                .device
                .create_graphics_pipelines(cache, &[pipeline_info], None)
                .map_err(|(_, e)| {
                    viewer_error!("viewer::Pipeline", "Failed to create graphics pipeline: {:?}", e);
                    context.device.destroy_pipeline_cache(cache, None);
                    Error::InitializationFailed(format!(
                        "Failed to create graphics pipeline: {:?}",
                        e
                    ))
                })?;

            Ok(Self {
                context,
                cache,
                pipeline: pipelines[0],
            })
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_pipeline(self.pipeline, None);
            self.context.device.destroy_pipeline_cache(self.cache, None);
        }
    }
}
