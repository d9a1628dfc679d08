/// Shader module loading
///
/// SPIR-V only: shading-language compilation is out of scope, so the caller
/// supplies precompiled `.spv` bytes (the demo reads them from disk).

use crate::error::{Error, Result};
use crate::vulkan_context::GpuContext;
use crate::viewer_error;
use ash::vk;
use std::sync::Arc;

/// The vertex + fragment shader modules for the fixed pipeline.
pub struct ShaderPair {
    context: Arc<GpuContext>,
    pub vertex: vk::ShaderModule,
    pub fragment: vk::ShaderModule,
}

impl ShaderPair {
    /// Build both modules from raw SPIR-V byte slices.
    pub fn from_spirv(
        context: Arc<GpuContext>,
        vertex_bytes: &[u8],
        fragment_bytes: &[u8],
    ) -> Result<Self> {
        let vertex = create_module(&context, vertex_bytes, "vertex")?;
        let fragment = match create_module(&context, fragment_bytes, "fragment") {
            Ok(module) => module,
            Err(e) => {
                unsafe { context.device.destroy_shader_module(vertex, None) };
                return Err(e);
            }
        };
        Ok(Self {
            context,
            vertex,
            fragment,
        })
    }
}

impl Drop for ShaderPair {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_shader_module(self.vertex, None);
            self.context.device.destroy_shader_module(self.fragment, None);
        }
    }
}

fn create_module(context: &GpuContext, bytes: &[u8], stage: &str) -> Result<vk::ShaderModule> {
    let words = spirv_words(bytes).ok_or_else(|| {
        viewer_error!(
            "viewer::ShaderPair",
            "{} shader is not valid SPIR-V ({} bytes)",
            stage,
            bytes.len()
        );
        Error::InvalidResource(format!("{} shader is not valid SPIR-V", stage))
    })?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&words);
    unsafe {
        context.device.create_shader_module(&create_info, None).map_err(|e| {
            viewer_error!(
                "viewer::ShaderPair",
                "Failed to create {} shader module: {:?}",
                stage,
                e
            );
            Error::InitializationFailed(format!("Failed to create {} shader module: {:?}", stage, e))
        })
    }
}

/// Reinterpret SPIR-V bytes as words, validating length and magic number.
///
/// Copies into an owned Vec so the byte slice does not need 4-byte
/// alignment.
fn spirv_words(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return None;
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    // SPIR-V magic number, either endianness
    if words[0] != 0x0723_0203 && words[0] != 0x0302_2307 {
        return None;
    }
    Some(words)
}
