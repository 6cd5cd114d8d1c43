//! Replays the engine's recorded canvas onto a nannou `Draw`.
//!
//! The canvas uses top-left origin with y down; nannou's window space is
//! centered with y up.

use audio_bloom_engine::{Canvas, DrawCommand, Rgba};
use nannou::prelude::*;

pub fn draw_canvas(draw: &Draw, bounds: Rect, canvas: &Canvas) {
    let to_window = |(x, y): (f32, f32)| pt2(bounds.left() + x, bounds.top() - y);

    for command in canvas.commands() {
        match command {
            DrawCommand::Polyline {
                points,
                weight,
                color,
            } => {
                draw.polyline()
                    .weight(*weight)
                    .points(points.iter().copied().map(to_window))
                    .color(to_nannou(*color));
            }
            DrawCommand::Circle {
                x,
                y,
                radius,
                weight,
                color,
            } => {
                draw.ellipse()
                    .xy(to_window((*x, *y)))
                    .radius(*radius)
                    .no_fill()
                    .stroke_weight(*weight)
                    .stroke(to_nannou(*color));
            }
        }
    }
}

fn to_nannou(color: Rgba) -> nannou::color::Rgba {
    nannou::color::rgba(color.r, color.g, color.b, color.a)
}
