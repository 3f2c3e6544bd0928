//! Typed scene graph. Shapes carry numeric geometry and colors only;
//! markup is produced by [`crate::svg`].

use serde::{Deserialize, Serialize};

/// A CSS color value (e.g. `#c3aed6`). Escaped on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke attributes for outlined shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash_array: Option<f64>,
    pub dash_offset: Option<f64>,
    pub line_cap: Option<LineCap>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash_array: None,
            dash_offset: None,
            line_cap: None,
        }
    }
}

/// One SVG path command in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Elliptical arc with equal radii (circular arc).
    ArcTo {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        /// Rotation in degrees about `center`.
        rotation: Option<f64>,
    },
    Path {
        commands: Vec<PathCommand>,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        fill: Color,
        corner_radius: f64,
    },
    Text {
        at: Point,
        content: String,
        font_size: f64,
        fill: Color,
        anchor: TextAnchor,
        bold: bool,
    },
    /// Child shapes translated by `offset`.
    Group { offset: Point, children: Vec<Shape> },
    /// A nested scene placed at `offset`, scaled to its own width/height.
    Embed { offset: Point, scene: Box<Scene> },
}

/// A complete drawable with a fixed viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}
