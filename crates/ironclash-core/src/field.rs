//! The battle field and axis-aligned collision geometry.

use glam::DVec2;
use ironclash_api::rules::ACTOR_SIZE;

/// The rectangular battle field. The origin is the bottom-left corner; +X
/// is east and +Y is north (heading zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BattleField {
    /// Width in field units.
    pub width: f64,
    /// Height in field units.
    pub height: f64,
}

impl BattleField {
    /// Creates a field of the given size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The region actor centers may occupy: the field inset by half an
    /// actor on every side.
    #[must_use]
    pub fn center_bounds(&self) -> BoundingBox {
        let half = ACTOR_SIZE / 2.0;
        BoundingBox {
            min: DVec2::splat(half),
            max: DVec2::new(self.width - half, self.height - half),
        }
    }

    /// True if a point lies on the field at all.
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Clamps an actor center into the legal region.
    #[must_use]
    pub fn clamp_center(&self, point: DVec2) -> DVec2 {
        let bounds = self.center_bounds();
        point.clamp(bounds.min, bounds.max)
    }
}

/// An axis-aligned box, used for actor bodies and hit tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower-left corner.
    pub min: DVec2,
    /// Upper-right corner.
    pub max: DVec2,
}

impl BoundingBox {
    /// The box of side `size` centered on `center`.
    #[must_use]
    pub fn centered(center: DVec2, size: f64) -> Self {
        let half = DVec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The body box of an actor at `center`.
    #[must_use]
    pub fn actor(center: DVec2) -> Self {
        Self::centered(center, ACTOR_SIZE)
    }

    /// True if the point is inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if the two boxes overlap (shared boundary counts).
    #[must_use]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// True if the segment from `start` to `end` passes through the box.
    ///
    /// Slab test. Degenerate segments reduce to a point-containment check.
    #[must_use]
    pub fn intersects_segment(&self, start: DVec2, end: DVec2) -> bool {
        let dir = end - start;
        let mut t_min: f64 = 0.0;
        let mut t_max: f64 = 1.0;

        for axis in 0..2 {
            let (d, s, lo, hi) = if axis == 0 {
                (dir.x, start.x, self.min.x, self.max.x)
            } else {
                (dir.y, start.y, self.min.y, self.max.y)
            };
            if d.abs() < f64::EPSILON {
                if s < lo || s > hi {
                    return false;
                }
            } else {
                let mut t1 = (lo - s) / d;
                let mut t2 = (hi - s) / d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_bounds_inset_by_half_actor() {
        let field = BattleField::new(800.0, 600.0);
        let bounds = field.center_bounds();
        assert_eq!(bounds.min, DVec2::new(18.0, 18.0));
        assert_eq!(bounds.max, DVec2::new(782.0, 582.0));
    }

    #[test]
    fn clamp_pulls_center_inside() {
        let field = BattleField::new(800.0, 600.0);
        let clamped = field.clamp_center(DVec2::new(-5.0, 700.0));
        assert_eq!(clamped, DVec2::new(18.0, 582.0));
    }

    #[test]
    fn boxes_overlap_on_shared_edge() {
        let a = BoundingBox::centered(DVec2::new(0.0, 0.0), 36.0);
        let b = BoundingBox::centered(DVec2::new(36.0, 0.0), 36.0);
        assert!(a.intersects(&b));
        let c = BoundingBox::centered(DVec2::new(37.0, 0.0), 36.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn segment_through_box() {
        let b = BoundingBox::centered(DVec2::new(50.0, 50.0), 36.0);
        assert!(b.intersects_segment(DVec2::new(0.0, 50.0), DVec2::new(100.0, 50.0)));
        assert!(!b.intersects_segment(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)));
        // Diagonal clipping a corner
        assert!(b.intersects_segment(DVec2::new(30.0, 70.0), DVec2::new(70.0, 30.0)));
    }

    #[test]
    fn degenerate_segment_is_point_test() {
        let b = BoundingBox::centered(DVec2::new(50.0, 50.0), 36.0);
        assert!(b.intersects_segment(DVec2::new(50.0, 50.0), DVec2::new(50.0, 50.0)));
        assert!(!b.intersects_segment(DVec2::new(0.0, 0.0), DVec2::new(0.0, 0.0)));
    }
}
