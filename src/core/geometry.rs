//! Two-dimensional points in image and lens space.

// std
use std::ops::Add;
// pbrt
use crate::core::pbrt::Float;

// see geometry.h

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

impl Point2f {
    pub fn new(x: Float, y: Float) -> Self {
        Point2f { x, y }
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl Add for Point2f {
    type Output = Point2f;
    fn add(self, rhs: Point2f) -> Point2f {
        Point2f {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

