//! Axis-aligned world rectangle

use crate::core::{DVec2, Error, Result};

/// World-space rectangle in screen orientation: `top < bottom`, `left < right`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }

    /// Reject inverted or NaN edges.
    pub fn validate(&self) -> Result<()> {
        // Negated comparisons so NaN edges are rejected too.
        if !(self.left <= self.right) || !(self.top <= self.bottom) {
            return Err(Error::InvalidBounds {
                left: self.left,
                right: self.right,
                top: self.top,
                bottom: self.bottom,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Check if point is strictly inside the rect (edges excluded)
    pub fn interior_contains(&self, p: DVec2) -> bool {
        p.x > self.left && p.x < self.right &&
        p.y > self.top && p.y < self.bottom
    }

    /// Check if `other` lies entirely inside this rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left && other.right <= self.right &&
        other.top >= self.top && other.bottom <= self.bottom
    }
}
