//! Basic geometric types used throughout layout, routing and rendering.
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Width and height of an element
//! - [`Bounds`] - An axis-aligned rectangle given by its min/max corners
//! - [`Insets`] - Per-side spacing such as padding

/// Tolerance used when comparing coordinates produced by float arithmetic.
pub const EPSILON: f32 = 1e-3;

/// A point in 2D space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let delta = other.sub_point(self);
        delta.x.hypot(delta.y)
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Returns true when both coordinates are within [`EPSILON`] of `other`.
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// Converts a point and size into a bounds rectangle
    ///
    /// The point is treated as the center of the bounds, and the size
    /// is distributed equally in all directions around that center.
    pub fn to_bounds(self, size: Size) -> Bounds {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;

        Bounds {
            min_x: self.x - half_width,
            min_y: self.y - half_height,
            max_x: self.x + half_width,
            max_y: self.y + half_height,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new Size with padding added to both width and height
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.left + insets.right,
            height: self.height + insets.top + insets.bottom,
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds whose top-left corner is `min_point`.
    pub fn new_from_top_left(min_point: Point, size: Size) -> Self {
        Self {
            min_x: min_point.x,
            min_y: min_point.y,
            max_x: min_point.x + size.width,
            max_y: min_point.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns the center of the bounds
    pub fn center(self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns true if `other` lies entirely inside these bounds (borders may touch).
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x - EPSILON
            && other.max_x <= self.max_x + EPSILON
            && other.min_y >= self.min_y - EPSILON
            && other.max_y <= self.max_y + EPSILON
    }

    /// Returns true if the interiors of the two bounds overlap.
    ///
    /// Bounds that merely share an edge do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x - EPSILON
            && other.min_x < self.max_x - EPSILON
            && self.min_y < other.max_y - EPSILON
            && other.min_y < self.max_y - EPSILON
    }

    /// Returns true if the segment `a`-`b` passes through the interior of the bounds.
    ///
    /// Segments that only run along the border or touch a corner are not
    /// considered intersecting. Uses Liang-Barsky clipping against the
    /// interior shrunk by [`EPSILON`].
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let min_x = self.min_x + EPSILON;
        let max_x = self.max_x - EPSILON;
        let min_y = self.min_y + EPSILON;
        let max_y = self.max_y - EPSILON;
        if min_x >= max_x || min_y >= max_y {
            return false;
        }

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0_f32;
        let mut t1 = 1.0_f32;

        for (p, q) in [
            (-dx, a.x - min_x),
            (dx, max_x - a.x),
            (-dy, a.y - min_y),
            (dy, max_y - a.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }

        t0 < t1
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}
