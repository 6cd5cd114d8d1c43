//! Drawing surface abstraction and the retained canvas implementation
//!
//! The engine only ever strokes paths and circle outlines and clears the
//! whole surface, so that is all [`Surface`] exposes. Hosts that render in a
//! separate pass (immediate-mode APIs such as nannou's `Draw`) use [`Canvas`],
//! which records commands for the host to replay each display frame.

use crate::{Extent, Rgba};

/// A pixel canvas the engine draws into.
///
/// Coordinates are in surface pixels with the origin at the top-left corner
/// and y pointing down. The surface is sized by its owner; the engine reads
/// [`Surface::extent`] at the start of every frame and never resizes it.
pub trait Surface {
    /// Current pixel size
    fn extent(&self) -> Extent;

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Stroke a connected line through `points`
    fn stroke_polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Rgba);

    /// Stroke a circle outline centered on `(x, y)`
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, weight: f32, color: Rgba);
}

/// One recorded draw operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Polyline {
        points: Vec<(f32, f32)>,
        weight: f32,
        color: Rgba,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        weight: f32,
        color: Rgba,
    },
}

/// Retained-mode surface: records draw commands until the next clear
#[derive(Clone, Debug, Default)]
pub struct Canvas {
    extent: Extent,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            extent: Extent::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Called by the owner on layout change. Recorded commands are kept;
    /// the next frame redraws at the new size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.extent = Extent::new(width, height);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[(f32, f32)]> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            DrawCommand::Circle { .. } => None,
        })
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Circle { .. }))
            .count()
    }
}

impl Surface for Canvas {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Rgba) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            weight,
            color,
        });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, weight: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            weight,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_records_and_clears() {
        let mut canvas = Canvas::new(320.0, 200.0);
        canvas.stroke_polyline(&[(0.0, 0.0), (10.0, 10.0)], 2.0, Rgba::WHITE);
        canvas.stroke_circle(5.0, 5.0, 3.0, 2.0, Rgba::WHITE);

        assert_eq!(canvas.commands().len(), 2);
        assert_eq!(canvas.circle_count(), 1);
        assert_eq!(canvas.polylines().count(), 1);

        canvas.clear();
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_canvas_resize_updates_extent() {
        let mut canvas = Canvas::new(320.0, 200.0);
        canvas.resize(1024.0, 768.0);
        assert_eq!(canvas.extent(), Extent::new(1024.0, 768.0));
    }
}
