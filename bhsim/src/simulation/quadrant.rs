//! Square regions of the plane used to bound quadtree nodes.

use super::states::{BodySource, NVec2};

/// Axis-aligned square: center and half the side length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrant {
    pub center: NVec2,
    pub half_width: f64,
}

/// Child slots in the order NW, NE, SW, SE (y grows north).
pub const NW: usize = 0;
pub const NE: usize = 1;
pub const SW: usize = 2;
pub const SE: usize = 3;

impl Quadrant {
    pub fn new(cx: f64, cy: f64, half_width: f64) -> Self {
        debug_assert!(half_width > 0.0, "quadrant half width must be positive");
        Self { center: NVec2::new(cx, cy), half_width }
    }

    /// Full side length
    pub fn width(&self) -> f64 {
        2.0 * self.half_width
    }

    /// True iff `p` lies in the closed square (edges included).
    /// NaN coordinates are never contained.
    pub fn contains(&self, p: NVec2) -> bool {
        let hw = self.half_width;
        p.x >= self.center.x - hw
            && p.x <= self.center.x + hw
            && p.y >= self.center.y - hw
            && p.y <= self.center.y + hw
    }

    /// Child slot for a point, decided against the center so that every
    /// point reaching a node lands in exactly one child even when the child
    /// edges are not exactly representable.
    pub fn child_index(&self, p: NVec2) -> usize {
        let east = p.x >= self.center.x;
        let north = p.y >= self.center.y;
        match (north, east) {
            (true, false) => NW,
            (true, true) => NE,
            (false, false) => SW,
            (false, true) => SE,
        }
    }

    /// The four quadrants that evenly quarter this one, indexed by
    /// [`NW`], [`NE`], [`SW`], [`SE`].
    pub fn subdivide(&self) -> [Quadrant; 4] {
        let h = self.half_width / 2.0;
        let (cx, cy) = (self.center.x, self.center.y);
        [
            Quadrant::new(cx - h, cy + h, h),
            Quadrant::new(cx + h, cy + h, h),
            Quadrant::new(cx - h, cy - h, h),
            Quadrant::new(cx + h, cy - h, h),
        ]
    }

    /// False once quartering would produce children whose centers round
    /// back onto this center, i.e. the region is at floating-point
    /// resolution and cannot separate two distinct points any further.
    pub fn is_divisible(&self) -> bool {
        let h = self.half_width / 2.0;
        let c = self.center;
        h > 0.0 && c.x - h != c.x && c.x + h != c.x && c.y - h != c.y && c.y + h != c.y
    }

    /// Square enclosing every body plus `margin` on each side.
    ///
    /// Centered on the midpoint of the bodies' bounding box; the half width
    /// is half of the larger span. Non-finite positions are skipped here and
    /// later rejected on insertion.
    pub fn enclosing<S: BodySource + ?Sized>(src: &S, margin: f64) -> Self {
        let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

        for i in 0..src.len() {
            let p = src.position(i);
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        if min.x > max.x {
            // no finite body at all
            return Quadrant::new(0.0, 0.0, margin);
        }

        let center = (min + max) * 0.5;
        let span = max - min;
        let half = 0.5 * span.x.max(span.y) + margin;
        Quadrant::new(center.x, center.y, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Body;

    #[test]
    fn edges_are_inclusive() {
        let q = Quadrant::new(0.0, 0.0, 1.0);
        assert!(q.contains(NVec2::new(1.0, 1.0)));
        assert!(q.contains(NVec2::new(-1.0, -1.0)));
        assert!(!q.contains(NVec2::new(1.0 + 1e-12, 0.0)));
        assert!(!q.contains(NVec2::new(f64::NAN, 0.0)));
    }

    #[test]
    fn children_match_child_index() {
        let q = Quadrant::new(2.0, -3.0, 4.0);
        let children = q.subdivide();
        for (idx, c) in children.iter().enumerate() {
            assert_eq!(c.half_width, 2.0);
            assert_eq!(q.child_index(c.center), idx);
        }
        assert_eq!(children[NW].center, NVec2::new(0.0, -1.0));
        assert_eq!(children[SE].center, NVec2::new(4.0, -5.0));
    }

    #[test]
    fn enclosing_covers_every_body() {
        let bodies = vec![
            Body::new(NVec2::new(-3.0, 1.0), NVec2::zeros(), 1.0),
            Body::new(NVec2::new(5.0, 2.0), NVec2::zeros(), 1.0),
            Body::new(NVec2::new(0.0, -7.0), NVec2::zeros(), 1.0),
        ];
        let q = Quadrant::enclosing(&bodies[..], 0.5);
        assert_eq!(q.center, NVec2::new(1.0, -2.5));
        assert_eq!(q.half_width, 4.5 + 0.5);
        assert!(bodies.iter().all(|b| q.contains(b.x)));
    }

    #[test]
    fn enclosing_single_body_uses_margin() {
        let bodies = vec![Body::new(NVec2::new(4.0, 4.0), NVec2::zeros(), 1.0)];
        let q = Quadrant::enclosing(&bodies[..], 2.0);
        assert_eq!(q.center, NVec2::new(4.0, 4.0));
        assert_eq!(q.half_width, 2.0);
    }
}
