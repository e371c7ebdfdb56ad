//! Time and host geometry types

use serde::{Deserialize, Serialize};

/// Simulation time in integer milliseconds
pub type Millis = u64;

/// An axis-aligned rectangle in window pixels (y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Horizontal placement of an emitter inside a host element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    Left,
    Right,
    #[default]
    Center,
    /// Span the full width of the element
    Fill,
}

/// Vertical placement of an emitter inside a host element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    Bottom,
    #[default]
    Center,
    /// Span the full height of the element
    Fill,
}

/// Alignment rule used to resolve an emission area from an element's bounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub horizontal: HorizontalAlign,
    #[serde(default)]
    pub vertical: VerticalAlign,
}

impl Alignment {
    pub const CENTER: Self = Self {
        horizontal: HorizontalAlign::Center,
        vertical: VerticalAlign::Center,
    };

    pub const fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}
