//! Render handle capability interface
//!
//! The pool and the culling pass only ever talk to handles through
//! [`RenderHandle`]; they never patch a handle's own per-frame behaviour.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Overlap test; touching edges do not count
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grow by `padding` on every side
    pub fn padded(&self, padding: f32) -> Self {
        Self {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }
}

/// What the pool needs from a reusable draw object
pub trait RenderHandle {
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Position, rotation, scale, opacity and tint back to defaults,
    /// hidden, texture detached
    fn reset_visual_state(&mut self);

    /// Screen-space bounds, `None` when they cannot be computed
    fn compute_bounds(&self) -> Option<Bounds>;

    /// Release backing resources; handles without any keep the default
    fn destroy(&mut self) {}
}

/// White, no tint
pub const NO_TINT: u32 = 0xFF_FF_FF;

/// Transient visual state of a sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
    pub alpha: f32,
    pub tint: u32,
    pub visible: bool,
    /// Assigned texture key
    pub texture: Option<String>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            alpha: 1.0,
            tint: NO_TINT,
            visible: false,
            texture: None,
        }
    }
}

/// Plain retained-mode sprite record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub state: VisualState,
    /// Unscaled size
    pub width: f32,
    pub height: f32,
    pub destroyed: bool,
}

impl Sprite {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            state: VisualState::default(),
            width,
            height,
            destroyed: false,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.state.x = x;
        self.state.y = y;
    }

    pub fn set_texture(&mut self, key: impl Into<String>) {
        self.state.texture = Some(key.into());
    }
}

impl RenderHandle for Sprite {
    fn set_visible(&mut self, visible: bool) {
        self.state.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.state.visible
    }

    fn reset_visual_state(&mut self) {
        self.state = VisualState::default();
    }

    fn compute_bounds(&self) -> Option<Bounds> {
        if self.destroyed {
            return None;
        }
        Some(Bounds::new(
            self.state.x,
            self.state.y,
            self.width * self.state.scale,
            self.height * self.state.scale,
        ))
    }

    fn destroy(&mut self) {
        self.state.texture = None;
        self.destroyed = true;
    }
}
