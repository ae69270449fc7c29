//! A simple sprite button.

use glam::Vec2;

use crate::{
    assets::{AssetId, Resources},
    canvas::Canvas,
    sprite::DrawParams,
    Context, MouseButton,
};

/// In which state the button can be.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Button is doing nothing.
    #[default]
    Normal,
    /// Button is hovered over by the mouse.
    Hover,
    /// Button is held down.
    Down,
}

/// A sprite button with hover art, an enabled flag and draw opacity.
#[derive(Debug)]
pub struct Button {
    /// Sprite when not hovering or pressing.
    pub normal: AssetId,
    /// Sprite when the mouse is over the button.
    pub hover: AssetId,
    /// Center position in buffer pixels.
    pub position: Vec2,
    /// Size of the click region in pixels, measured from the normal sprite.
    pub size: Vec2,
    /// Whether the button reacts to the pointer at all.
    pub enabled: bool,
    /// Whether the button is drawn.
    pub visible: bool,
    /// Opacity the button is drawn with.
    pub alpha: f32,
    /// Current interaction state.
    state: State,
}

impl Button {
    /// Create an enabled button at the origin.
    ///
    /// The click region is measured from the normal sprite; when that asset
    /// failed to load the region is empty and the button can never fire.
    #[must_use]
    pub fn new(normal: AssetId, hover: AssetId, resources: &Resources) -> Self {
        let size = resources
            .sprite(&normal)
            .map_or(Vec2::ZERO, |sprite| sprite.size());

        Self {
            normal,
            hover,
            position: Vec2::ZERO,
            size,
            enabled: true,
            visible: true,
            alpha: 1.0,
            state: State::Normal,
        }
    }

    /// Handle the pointer for one tick.
    ///
    /// Returns `true` when the button is released over its click region.
    pub fn update(&mut self, ctx: &Context) -> bool {
        self.transition(
            ctx.mouse().is_some_and(|mouse| self.contains(mouse)),
            ctx.mouse_pressed(MouseButton::Left),
            ctx.mouse_released(MouseButton::Left),
        )
    }

    /// Drive the interaction state machine directly.
    ///
    /// Returns `true` when the button is released.
    pub fn transition(&mut self, over: bool, pressed: bool, released: bool) -> bool {
        if !self.enabled || !self.visible {
            self.state = State::Normal;

            return false;
        }

        match self.state {
            State::Normal => {
                if over {
                    self.state = State::Hover;
                }

                false
            }
            State::Hover => {
                if !over {
                    self.state = State::Normal;
                } else if pressed {
                    self.state = State::Down;
                }

                false
            }
            State::Down => {
                if released {
                    self.state = if over { State::Hover } else { State::Normal };

                    // Only a release over the button counts as a click
                    over
                } else {
                    false
                }
            }
        }
    }

    /// Render the button.
    pub fn draw(&self, canvas: &mut Canvas, resources: &Resources) {
        if !self.visible {
            return;
        }

        // Swap to the hover art while the pointer is over or holding it
        let id = match self.state {
            State::Normal => &self.normal,
            State::Hover | State::Down => &self.hover,
        };

        if let Some(sprite) = resources.sprite(id) {
            sprite.draw_with(canvas, self.position, DrawParams::alpha(self.alpha));
        }
    }

    /// Current interaction state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the point lies inside the click region.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return false;
        }

        let half = self.size / 2.0;

        (point.x - self.position.x).abs() <= half.x && (point.y - self.position.y).abs() <= half.y
    }
}
