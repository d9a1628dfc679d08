//! Rotating textured cube demo
//!
//! Opens a window, brings up the renderer against it, and drives the
//! per-frame update/render cycle from the winit event loop. A stale
//! surface (resize, monitor change) reports `NeedsRebuild`, which routes
//! back through `VulkanRenderer::resize`.
//!
//! Shader binaries are loaded from `shaders/cube.vert.spv` and
//! `shaders/cube.frag.spv` next to the executable's working directory, or
//! from the two paths given as command-line arguments. The GLSL sources
//! live in `shaders/` and compile with:
//!
//! ```text
//! glslangValidator -V shaders/cube.vert -o shaders/cube.vert.spv
//! glslangValidator -V shaders/cube.frag -o shaders/cube.frag.spv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use vulkan_viewer::{viewer_error, viewer_info, FrameStatus, RendererConfig, VulkanRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

struct DemoApp {
    vertex_shader: Vec<u8>,
    fragment_shader: Vec<u8>,
    window: Option<Window>,
    renderer: Option<VulkanRenderer>,
}

impl DemoApp {
    fn new(vertex_shader: Vec<u8>, fragment_shader: Vec<u8>) -> Self {
        Self {
            vertex_shader,
            fragment_shader,
            window: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Vulkan Viewer - Cube")
            .with_inner_size(LogicalSize::new(800, 600));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => window,
            Err(e) => {
                viewer_error!("demo", "Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let config = RendererConfig {
            app_name: "Vulkan Viewer Demo".to_string(),
            vertex_shader: self.vertex_shader.clone(),
            fragment_shader: self.fragment_shader.clone(),
            ..RendererConfig::default()
        };

        match VulkanRenderer::new(&window, config) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(e) => {
                viewer_error!("demo", "Failed to initialize renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                viewer_info!("demo", "Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = renderer.resize(size.width, size.height) {
                    viewer_error!("demo", "Resize failed: {}", e);
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                let frame = renderer.update().and_then(|_| renderer.render_frame());
                match frame {
                    Ok(FrameStatus::Presented) => {}
                    Ok(FrameStatus::NeedsRebuild) => {
                        let (width, height) = renderer.window_size();
                        if let Err(e) = renderer.resize(width, height) {
                            viewer_error!("demo", "Swapchain rebuild failed: {}", e);
                            event_loop.exit();
                        }
                    }
                    Err(e) => {
                        viewer_error!("demo", "Frame failed: {}", e);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn shader_paths() -> (PathBuf, PathBuf) {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(vertex), Some(fragment)) => (PathBuf::from(vertex), PathBuf::from(fragment)),
        _ => (
            PathBuf::from("shaders/cube.vert.spv"),
            PathBuf::from("shaders/cube.frag.spv"),
        ),
    }
}

fn main() -> ExitCode {
    let (vertex_path, fragment_path) = shader_paths();

    let vertex_shader = match std::fs::read(&vertex_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            viewer_error!("demo", "Cannot read {}: {}", vertex_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let fragment_shader = match std::fs::read(&fragment_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            viewer_error!("demo", "Cannot read {}: {}", fragment_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            viewer_error!("demo", "Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new(vertex_shader, fragment_shader);
    if let Err(e) = event_loop.run_app(&mut app) {
        viewer_error!("demo", "Event loop error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
