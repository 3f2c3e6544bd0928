//! SVG serialization of [`Scene`]s.
//!
//! All text content and attribute values are XML-escaped, so labels coming
//! from external data cannot inject markup.

use crate::scene::{LineCap, PathCommand, Scene, Shape, Stroke, TextAnchor};
use std::fmt::Write;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialize a scene as a standalone `<svg>` document.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="{SVG_NS}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(scene.width),
        h = num(scene.height),
    );
    for shape in &scene.shapes {
        write_shape(&mut out, shape);
    }
    out.push_str("</svg>");
    out
}

/// Escape a string for use in XML text or a double-quoted attribute.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Format a coordinate: at most 3 decimals, no trailing zeros.
/// Non-finite values are written as 0.
pub fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Render path commands as SVG path data.
pub fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        match cmd {
            PathCommand::MoveTo(p) => {
                let _ = write!(d, "M {} {}", num(p.x), num(p.y));
            }
            PathCommand::LineTo(p) => {
                let _ = write!(d, "L {} {}", num(p.x), num(p.y));
            }
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => {
                let r = num(*radius);
                let _ = write!(
                    d,
                    "A {r} {r} 0 {} {} {} {}",
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    num(to.x),
                    num(to.y)
                );
            }
            PathCommand::Close => d.push('Z'),
        }
    }
    d
}

fn write_stroke(out: &mut String, stroke: &Stroke) {
    let _ = write!(
        out,
        r#" stroke="{}" stroke-width="{}""#,
        escape(stroke.color.as_str()),
        num(stroke.width)
    );
    if let Some(dash) = stroke.dash_array {
        let _ = write!(out, r#" stroke-dasharray="{}""#, num(dash));
    }
    if let Some(offset) = stroke.dash_offset {
        let _ = write!(out, r#" stroke-dashoffset="{}""#, num(offset));
    }
    if let Some(cap) = stroke.line_cap {
        let cap = match cap {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        };
        let _ = write!(out, r#" stroke-linecap="{cap}""#);
    }
}

fn write_shape(out: &mut String, shape: &Shape) {
    match shape {
        Shape::Circle {
            center,
            radius,
            fill,
            stroke,
            rotation,
        } => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}""#,
                num(center.x),
                num(center.y),
                num(*radius)
            );
            match fill {
                Some(f) => {
                    let _ = write!(out, r#" fill="{}""#, escape(f.as_str()));
                }
                None => out.push_str(r#" fill="none""#),
            }
            if let Some(s) = stroke {
                write_stroke(out, s);
            }
            if let Some(deg) = rotation {
                let _ = write!(
                    out,
                    r#" transform="rotate({} {} {})""#,
                    num(*deg),
                    num(center.x),
                    num(center.y)
                );
            }
            out.push_str("/>");
        }
        Shape::Path { commands, fill } => {
            let _ = write!(
                out,
                r#"<path d="{}" fill="{}"/>"#,
                path_data(commands),
                escape(fill.as_str())
            );
        }
        Shape::Line { from, to, stroke } => {
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
                num(from.x),
                num(from.y),
                num(to.x),
                num(to.y)
            );
            write_stroke(out, stroke);
            out.push_str("/>");
        }
        Shape::Rect {
            origin,
            width,
            height,
            fill,
            corner_radius,
        } => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                num(origin.x),
                num(origin.y),
                num(width.max(0.0)),
                num(height.max(0.0)),
                escape(fill.as_str())
            );
            if *corner_radius > 0.0 {
                let _ = write!(out, r#" rx="{}""#, num(*corner_radius));
            }
            out.push_str("/>");
        }
        Shape::Text {
            at,
            content,
            font_size,
            fill,
            anchor,
            bold,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" text-anchor="{anchor}" dominant-baseline="middle" font-size="{}" fill="{}""#,
                num(at.x),
                num(at.y),
                num(*font_size),
                escape(fill.as_str())
            );
            if *bold {
                out.push_str(r#" font-weight="bold""#);
            }
            let _ = write!(out, ">{}</text>", escape(content));
        }
        Shape::Group { offset, children } => {
            let _ = write!(
                out,
                r#"<g transform="translate({} {})">"#,
                num(offset.x),
                num(offset.y)
            );
            for child in children {
                write_shape(out, child);
            }
            out.push_str("</g>");
        }
        Shape::Embed { offset, scene } => {
            let _ = write!(
                out,
                r#"<svg x="{}" y="{}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                num(offset.x),
                num(offset.y),
                w = num(scene.width),
                h = num(scene.height),
            );
            for child in &scene.shapes {
                write_shape(out, child);
            }
            out.push_str("</svg>");
        }
    }
}
