//! Axis-aligned rectangles

/// Overlaps thinner than this are ignored
pub const OVERLAP_TOLERANCE: f64 = 1.0e-5;

/// An axis-aligned rectangle, in database units
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Lower x coordinate
    pub lx: f64,
    /// Lower y coordinate
    pub ly: f64,
    /// Upper x coordinate
    pub hx: f64,
    /// Upper y coordinate
    pub hy: f64,
}

impl Rect {
    /// Create a rectangle from its corners
    pub fn new(lx: f64, ly: f64, hx: f64, hy: f64) -> Rect {
        Rect { lx, ly, hx, hy }
    }

    /// Create a rectangle from its lower-left corner and its dimensions
    pub fn from_size(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle
    pub fn width(&self) -> f64 {
        self.hx - self.lx
    }

    /// Height of the rectangle
    pub fn height(&self) -> f64 {
        self.hy - self.ly
    }

    /// Area of the rectangle, zero if it is empty
    pub fn area(&self) -> f64 {
        (self.width() * self.height()).max(0.0)
    }

    /// Clip the rectangle to another one
    pub fn clip(&self, bound: &Rect) -> Rect {
        Rect {
            lx: self.lx.max(bound.lx),
            ly: self.ly.max(bound.ly),
            hx: self.hx.min(bound.hx),
            hy: self.hy.min(bound.hy),
        }
    }

    /// Area shared with another rectangle
    ///
    /// Overlaps thinner than [`OVERLAP_TOLERANCE`] in either direction count as zero.
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let common = self.clip(other);
        if common.width() > OVERLAP_TOLERANCE && common.height() > OVERLAP_TOLERANCE {
            common.width() * common.height()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_size(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.overlap_area(&b), 25.0);
        assert_eq!(b.overlap_area(&a), 25.0);
        assert_eq!(a.overlap_area(&a), 100.0);
    }

    #[test]
    fn test_touching() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.overlap_area(&b), 0.0);
        let sliver = Rect::new(9.999999, 0.0, 20.0, 10.0);
        assert_eq!(a.overlap_area(&sliver), 0.0);
    }

    #[test]
    fn test_clip() {
        let die = Rect::new(0.0, 0.0, 15.0, 15.0);
        let bin = Rect::new(10.0, 10.0, 20.0, 20.0).clip(&die);
        assert_eq!(bin, Rect::new(10.0, 10.0, 15.0, 15.0));
        assert_eq!(bin.area(), 25.0);
        assert_eq!(Rect::new(5.0, 5.0, 0.0, 0.0).area(), 0.0);
    }
}
