//! Geometry and display types

use crate::error::{NestError, Result};
use serde::{Deserialize, Serialize};

/// A 2D point in layout coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// True when `self` is strictly less than `other` on both axes
    pub fn strictly_before(&self, other: &Point) -> bool {
        self.x < other.x && self.y < other.y
    }
}

impl From<[f64; 2]> for Point {
    fn from(arr: [f64; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        p.to_array()
    }
}

/// An axis-aligned rectangle.
///
/// `left_top` is strictly less than `right_bottom` on both axes; the
/// constructor and deserializer reject anything else.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectDef")]
pub struct Rect {
    left_top: Point,
    right_bottom: Point,
}

#[derive(Deserialize)]
struct RectDef {
    left_top: Point,
    right_bottom: Point,
}

impl TryFrom<RectDef> for Rect {
    type Error = NestError;

    fn try_from(def: RectDef) -> Result<Self> {
        Rect::new(def.left_top, def.right_bottom)
    }
}

impl Rect {
    pub fn new(left_top: Point, right_bottom: Point) -> Result<Self> {
        if !left_top.strictly_before(&right_bottom) {
            return Err(NestError::InvalidRegion(format!(
                "left-top ({}, {}) must be strictly less than right-bottom ({}, {})",
                left_top.x, left_top.y, right_bottom.x, right_bottom.y
            )));
        }
        Ok(Self {
            left_top,
            right_bottom,
        })
    }

    /// Build from `left, top, right, bottom` edges
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Result<Self> {
        Self::new(Point::new(left, top), Point::new(right, bottom))
    }

    /// Strict containment: `other` lies inside `self` without touching any edge
    pub fn strictly_contains(&self, other: &Rect) -> bool {
        self.left_top.strictly_before(&other.left_top)
            && other.right_bottom.strictly_before(&self.right_bottom)
    }
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Semi-transparent red painted over regions with active errors
    pub const ERROR_TINT: Self = Self {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 0.5,
    };

    /// CSS-style `rgba(r, g, b, a)` string for hosts that render to the web
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}
