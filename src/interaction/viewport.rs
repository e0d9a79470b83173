use crate::ir::Point;

/// Screen <-> content transform: `screen = content * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Viewport {
    pub fn to_content(&self, screen: Point) -> Point {
        (
            (screen.0 - self.pan.0) / self.zoom,
            (screen.1 - self.pan.1) / self.zoom,
        )
    }

    pub fn to_screen(&self, content: Point) -> Point {
        (
            content.0 * self.zoom + self.pan.0,
            content.1 * self.zoom + self.pan.1,
        )
    }

    /// Zooms by `factor` around the screen point `anchor`, keeping the content
    /// point under it fixed. Returns false when the clamp leaves the zoom
    /// unchanged.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32, min: f32, max: f32) -> bool {
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(min, max);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return false;
        }
        let content = self.to_content(anchor);
        self.zoom = new_zoom;
        self.pan = (
            anchor.0 - content.0 * new_zoom,
            anchor.1 - content.1 * new_zoom,
        );
        true
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.pan.0 += delta.0;
        self.pan.1 += delta.1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keeps_the_anchor_fixed() {
        let mut viewport = Viewport {
            zoom: 1.5,
            pan: (30.0, -20.0),
        };
        let anchor = (250.0, 140.0);
        let before = viewport.to_content(anchor);
        assert!(viewport.zoom_at(anchor, 1.2, 0.2, 5.0));
        let after = viewport.to_content(anchor);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_at((0.0, 0.0), 100.0, 0.2, 5.0);
        assert_eq!(viewport.zoom, 5.0);
        assert!(!viewport.zoom_at((0.0, 0.0), 2.0, 0.2, 5.0));
    }

    #[test]
    fn screen_and_content_invert() {
        let viewport = Viewport {
            zoom: 2.0,
            pan: (10.0, 5.0),
        };
        assert_eq!(viewport.to_screen(viewport.to_content((50.0, 25.0))), (50.0, 25.0));
    }
}
