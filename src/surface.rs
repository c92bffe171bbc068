//! Render contract between the simulation and whatever draws it.
//!
//! Everything the simulation draws goes through the [`Surface`] trait in
//! screen space: pixels, origin top-left, y down.  The simulation never owns
//! the surface; it only issues calls against it during `draw`.
//!
//! [`DrawList`] is the recording implementation.  It bakes the current global
//! alpha and translation into every [`DrawCommand`] as it is recorded, so a
//! back-end can replay the list without tracking state (see
//! [`crate::plugin::draw_list_gizmo_system`]), and tests can inspect exactly
//! what a frame drew.

use bevy::color::{Alpha, Color};
use bevy::math::Vec2;
use bevy::prelude::Resource;

/// Primitive drawing operations in screen space.
pub trait Surface {
    /// Drawable size in pixels.
    fn size(&self) -> Vec2;

    /// Fill the whole surface (ignores alpha and translation).
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Disc shaded from `inner` at the centre to `outer` at `radius`.
    fn radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);

    /// Rectangle shaded from `top` to `bottom`.
    fn linear_gradient(&mut self, min: Vec2, size: Vec2, top: Color, bottom: Color);

    /// Text centred horizontally on `pos`.
    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Color);

    /// Global alpha multiplied into every following primitive.
    fn set_alpha(&mut self, alpha: f32);
    fn alpha(&self) -> f32;

    /// Offset every following primitive (screen shake).  Nested pushes add up.
    fn push_translation(&mut self, offset: Vec2);
    fn pop_translation(&mut self);
}

/// One recorded primitive with alpha and translation already applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect {
        min: Vec2,
        size: Vec2,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Color,
    },
    RadialGradient {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
    },
    LinearGradient {
        min: Vec2,
        size: Vec2,
        top: Color,
        bottom: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
    },
}

/// Recording [`Surface`] of a fixed pixel size.
#[derive(Resource, Debug, Clone)]
pub struct DrawList {
    size: Vec2,
    alpha: f32,
    offsets: Vec<Vec2>,
    commands: Vec<DrawCommand>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new(Vec2::new(1280.0, 720.0))
    }
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            alpha: 1.0,
            offsets: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Drop recorded commands and reset alpha and translation.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.offsets.clear();
        self.alpha = 1.0;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn offset(&self) -> Vec2 {
        self.offsets.iter().copied().sum()
    }

    fn tint(&self, color: Color) -> Color {
        color.with_alpha(color.alpha() * self.alpha)
    }
}

impl Surface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            min: min + self.offset(),
            size,
            color: self.tint(color),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center: center + self.offset(),
            radius,
            color: self.tint(color),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center: center + self.offset(),
            radius,
            width,
            color: self.tint(color),
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let offset = self.offset();
        self.commands.push(DrawCommand::Line {
            from: from + offset,
            to: to + offset,
            width,
            color: self.tint(color),
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let offset = self.offset();
        self.commands.push(DrawCommand::FillPolygon {
            points: points.iter().map(|&p| p + offset).collect(),
            color: self.tint(color),
        });
    }

    fn radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        self.commands.push(DrawCommand::RadialGradient {
            center: center + self.offset(),
            radius,
            inner: self.tint(inner),
            outer: self.tint(outer),
        });
    }

    fn linear_gradient(&mut self, min: Vec2, size: Vec2, top: Color, bottom: Color) {
        self.commands.push(DrawCommand::LinearGradient {
            min: min + self.offset(),
            size,
            top: self.tint(top),
            bottom: self.tint(bottom),
        });
    }

    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos: pos + self.offset(),
            text: text.to_string(),
            size,
            color: self.tint(color),
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn push_translation(&mut self, offset: Vec2) {
        self.offsets.push(offset);
    }

    fn pop_translation(&mut self) {
        self.offsets.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_baked_into_commands() {
        let mut list = DrawList::new(Vec2::new(100.0, 100.0));
        list.set_alpha(0.5);
        list.fill_circle(Vec2::ZERO, 3.0, Color::WHITE);
        match &list.commands()[0] {
            DrawCommand::FillCircle { color, .. } => {
                assert!((color.alpha() - 0.5).abs() < 1e-6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn alpha_is_clamped() {
        let mut list = DrawList::default();
        list.set_alpha(1.7);
        assert_eq!(list.alpha(), 1.0);
        list.set_alpha(-0.2);
        assert_eq!(list.alpha(), 0.0);
    }

    #[test]
    fn translations_nest_and_pop() {
        let mut list = DrawList::new(Vec2::new(100.0, 100.0));
        list.push_translation(Vec2::new(2.0, 0.0));
        list.push_translation(Vec2::new(0.0, 3.0));
        list.line(Vec2::ZERO, Vec2::ONE, 1.0, Color::WHITE);
        list.pop_translation();
        list.fill_rect(Vec2::ZERO, Vec2::ONE, Color::WHITE);
        list.pop_translation();
        list.fill_rect(Vec2::ZERO, Vec2::ONE, Color::WHITE);

        assert!(matches!(
            list.commands()[0],
            DrawCommand::Line { from, .. } if from == Vec2::new(2.0, 3.0)
        ));
        assert!(matches!(
            list.commands()[1],
            DrawCommand::FillRect { min, .. } if min == Vec2::new(2.0, 0.0)
        ));
        assert!(matches!(
            list.commands()[2],
            DrawCommand::FillRect { min, .. } if min == Vec2::ZERO
        ));
    }

    #[test]
    fn degenerate_polygon_is_skipped() {
        let mut list = DrawList::default();
        list.fill_polygon(&[Vec2::ZERO, Vec2::ONE], Color::WHITE);
        assert!(list.is_empty());
    }

    #[test]
    fn reset_clears_state() {
        let mut list = DrawList::default();
        list.set_alpha(0.2);
        list.push_translation(Vec2::ONE);
        list.clear(Color::BLACK);
        list.reset();
        assert!(list.is_empty());
        assert_eq!(list.alpha(), 1.0);
        list.fill_rect(Vec2::ZERO, Vec2::ONE, Color::WHITE);
        assert!(matches!(
            list.commands()[0],
            DrawCommand::FillRect { min, .. } if min == Vec2::ZERO
        ));
    }
}
