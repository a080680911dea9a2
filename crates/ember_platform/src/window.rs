use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl PlatformConfig {
    /// Fixed-size window matching the simulation viewport. The camera clamp
    /// assumes the viewport never changes, so the window is not resizable.
    pub fn for_viewport(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::for_viewport("Emberfall", 800, 640)
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(false)
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    Arc::new(window)
}

/// Window title with the live frame rate, refreshed by the main loop.
pub fn caption_with_fps(title: &str, fps: f64) -> String {
    format!("{} running at {} frames per second", title, fps as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_truncates_fps() {
        assert_eq!(
            caption_with_fps("Emberfall", 59.94),
            "Emberfall running at 59 frames per second"
        );
    }

    #[test]
    fn default_matches_classic_viewport() {
        let config = PlatformConfig::default();
        assert_eq!((config.width, config.height), (800, 640));
    }
}
