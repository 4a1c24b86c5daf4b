//! Background image display state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::Rect;

/// How the background image is scaled onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Whole image visible, letterboxed
    #[default]
    Fit,
    /// Canvas fully covered, image cropped
    Cover,
}

/// A decoded image supplied by the platform layer
///
/// `handle` is opaque to the engine; the rasterizer resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundState {
    pub handle: u64,
    /// Pixel dimensions of the decoded image
    pub width: u32,
    pub height: u32,
    pub opacity: f32,
    pub visible: bool,
    pub fit: BackgroundFit,
}

impl BackgroundState {
    pub fn new(handle: u64, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
            opacity: 1.0,
            visible: true,
            fit: BackgroundFit::Fit,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        self
    }

    pub fn with_fit(mut self, fit: BackgroundFit) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Whether anything would be drawn
    pub fn is_drawable(&self) -> bool {
        self.visible && self.opacity > 0.0 && self.width > 0 && self.height > 0
    }

    /// Destination rectangle on a canvas of `canvas` size, centered and
    /// aspect-preserving. `None` when either side is degenerate.
    pub fn dest_rect(&self, canvas: Vec2) -> Option<Rect> {
        if self.width == 0 || self.height == 0 || !(canvas.x > 0.0 && canvas.y > 0.0) {
            return None;
        }
        let image = Vec2::new(self.width as f32, self.height as f32);
        let ratio = canvas / image;
        let scale = match self.fit {
            BackgroundFit::Fit => ratio.min_element(),
            BackgroundFit::Cover => ratio.max_element(),
        };
        Some(Rect::from_center_size(canvas * 0.5, image * scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_letterboxes() {
        let bg = BackgroundState::new(1, 200, 100);
        let rect = bg.dest_rect(Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(rect.min, Vec2::new(0.0, 25.0));
        assert_eq!(rect.max, Vec2::new(100.0, 75.0));
    }

    #[test]
    fn test_cover_crops() {
        let bg = BackgroundState::new(1, 200, 100).with_fit(BackgroundFit::Cover);
        let rect = bg.dest_rect(Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(rect.size(), Vec2::new(200.0, 100.0));
        assert_eq!(rect.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(BackgroundState::new(1, 0, 10).dest_rect(Vec2::splat(10.0)).is_none());
        assert!(BackgroundState::new(1, 10, 10).dest_rect(Vec2::ZERO).is_none());
        assert!(!BackgroundState::new(1, 10, 10).with_opacity(0.0).is_drawable());
        assert!(!BackgroundState::new(1, 10, 10).with_visible(false).is_drawable());
    }
}
