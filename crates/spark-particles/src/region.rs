//! Spawn area resolved from host geometry

use crate::sampling::uniform_i32;
use glam::Vec2;
use rand::RngCore;
use spark_core::{Alignment, HorizontalAlign, Rect, VerticalAlign};

/// Rectangle of spawn points in the drawing surface's pixel space.
/// An axis whose min equals its max always spawns on that line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl SpawnRegion {
    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// A single window coordinate, made relative to the surface at
    /// `parent_origin`
    pub fn point(x: i32, y: i32, parent_origin: (i32, i32)) -> Self {
        let x = x - parent_origin.0;
        let y = y - parent_origin.1;
        Self::new(x, x, y, y)
    }

    /// Resolve an element's window bounds and an alignment into a region
    /// relative to the surface at `parent_origin`.
    pub fn from_bounds(bounds: Rect, parent_origin: (i32, i32), alignment: Alignment) -> Self {
        let left = bounds.x - parent_origin.0;
        let top = bounds.y - parent_origin.1;

        let (x_min, x_max) = match alignment.horizontal {
            HorizontalAlign::Left => (left, left),
            HorizontalAlign::Right => (left + bounds.width, left + bounds.width),
            HorizontalAlign::Center => (left + bounds.width / 2, left + bounds.width / 2),
            HorizontalAlign::Fill => (left, left + bounds.width),
        };
        let (y_min, y_max) = match alignment.vertical {
            VerticalAlign::Top => (top, top),
            VerticalAlign::Bottom => (top + bounds.height, top + bounds.height),
            VerticalAlign::Center => (top + bounds.height / 2, top + bounds.height / 2),
            VerticalAlign::Fill => (top, top + bounds.height),
        };
        Self::new(x_min, x_max, y_min, y_max)
    }

    pub fn is_point(&self) -> bool {
        self.x_min == self.x_max && self.y_min == self.y_max
    }

    /// Pick a spawn point: fixed on degenerate axes, otherwise uniform in
    /// `[min, max)`
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec2 {
        let x = uniform_i32(rng, self.x_min, self.x_max);
        let y = uniform_i32(rng, self.y_min, self.y_max);
        Vec2::new(x as f32, y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BUTTON: Rect = Rect::new(100, 300, 80, 40);

    #[test]
    fn center_alignment_is_a_point() {
        let region = SpawnRegion::from_bounds(BUTTON, (0, 50), Alignment::CENTER);
        assert_eq!(region, SpawnRegion::new(140, 140, 270, 270));
        assert!(region.is_point());
    }

    #[test]
    fn edge_alignments() {
        let region = SpawnRegion::from_bounds(
            BUTTON,
            (0, 0),
            Alignment::new(HorizontalAlign::Right, VerticalAlign::Top),
        );
        assert_eq!(region, SpawnRegion::new(180, 180, 300, 300));

        let region = SpawnRegion::from_bounds(
            BUTTON,
            (0, 0),
            Alignment::new(HorizontalAlign::Left, VerticalAlign::Bottom),
        );
        assert_eq!(region, SpawnRegion::new(100, 100, 340, 340));
    }

    #[test]
    fn fill_spans_extent() {
        let region = SpawnRegion::from_bounds(
            BUTTON,
            (0, 0),
            Alignment::new(HorizontalAlign::Fill, VerticalAlign::Top),
        );
        assert_eq!(region, SpawnRegion::new(100, 180, 300, 300));

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let p = region.sample(&mut rng);
            assert!((100.0..180.0).contains(&p.x));
            assert_eq!(p.y, 300.0);
        }
    }

    #[test]
    fn point_is_parent_relative() {
        let region = SpawnRegion::point(50, 60, (10, 20));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(region.sample(&mut rng), Vec2::new(40.0, 40.0));
    }
}
