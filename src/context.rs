//! Main interface between the game state and the window.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use glam::Vec2;
use winit::window::{Fullscreen, Window};
use winit_input_helper::WinitInputHelper;

use crate::{config::Config, KeyCode, MouseButton};

/// Context for interfacing with the window and the input state.
///
/// Exposed in all [`crate::Game`] callbacks; cheap to clone because it is an
/// `Rc<RefCell<..>>` under the hood.
#[derive(Clone)]
pub struct Context {
    /// Implementation of all non-primitive parts.
    inner: Rc<RefCell<ContextInner>>,
}

impl Context {
    /// Size of the logical pixel buffer.
    ///
    /// This is the coordinate space everything is drawn and positioned in;
    /// the dimensions swap when the window orientation flips.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        self.read(|ctx| (ctx.buffer_size.x, ctx.buffer_size.y))
    }

    /// Mouse position in buffer pixels.
    ///
    /// `None` when the cursor is outside of the letterboxed buffer.
    #[inline]
    #[must_use]
    pub fn mouse(&self) -> Option<Vec2> {
        self.read(|ctx| ctx.mouse)
    }

    /// Whether the mouse button goes from released to pressed this tick.
    #[inline]
    #[must_use]
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.read(|ctx| ctx.input.mouse_pressed(button))
    }

    /// Whether the mouse button is being held down.
    #[inline]
    #[must_use]
    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.read(|ctx| ctx.input.mouse_held(button))
    }

    /// Whether the mouse button goes from pressed to released this tick.
    #[inline]
    #[must_use]
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.read(|ctx| ctx.input.mouse_released(button))
    }

    /// Whether the key goes from released to pressed this tick.
    #[inline]
    #[must_use]
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.read(|ctx| ctx.input.key_pressed(key))
    }

    /// Seconds a single update tick takes, a constant.
    #[inline]
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.read(|ctx| ctx.delta_time)
    }

    /// Smoothed frames drawn per second.
    #[inline]
    #[must_use]
    pub fn frames_per_second(&self) -> f32 {
        self.read(|ctx| ctx.frames_per_second)
    }

    /// Stop the game and close the window after this tick.
    #[inline]
    pub fn exit(&self) {
        self.write(|ctx| ctx.exit = true);
    }

    /// Toggle borderless fullscreen mode.
    #[inline]
    pub fn toggle_fullscreen(&self) {
        self.write(|ctx| {
            // Check if we currently are in fullscreen mode
            let is_fullscreen = ctx.window.fullscreen().is_some();

            ctx.window.set_fullscreen(if is_fullscreen {
                None
            } else {
                Some(Fullscreen::Borderless(None))
            });
        });
    }
}

/// Internally used methods.
impl Context {
    /// Create the context for a fresh window.
    pub(crate) fn new(config: &Config, window: Arc<Window>) -> Self {
        let inner = Rc::new(RefCell::new(ContextInner {
            window,
            input: WinitInputHelper::new(),
            mouse: None,
            buffer_size: config.buffer_size,
            delta_time: config.update_delta_time(),
            frames_per_second: 0.0,
            exit: false,
        }));

        Self { inner }
    }

    /// Get a read-only reference to the inner struct.
    #[inline]
    pub(crate) fn read<R>(&self, reader: impl FnOnce(&ContextInner) -> R) -> R {
        reader(&self.inner.borrow())
    }

    /// Get a mutable reference to the inner struct.
    #[inline]
    pub(crate) fn write<R>(&self, writer: impl FnOnce(&mut ContextInner) -> R) -> R {
        writer(&mut self.inner.borrow_mut())
    }
}

/// Internal wrapped implementation for [`Context`].
pub(crate) struct ContextInner {
    /// Window instance, used for fullscreen toggling.
    pub(crate) window: Arc<Window>,
    /// Winit input helper state, cloned in from the event loop every batch.
    pub(crate) input: WinitInputHelper,
    /// Mouse position mapped into buffer pixels.
    pub(crate) mouse: Option<Vec2>,
    /// Size of the logical pixel buffer.
    pub(crate) buffer_size: Vec2,
    /// Seconds a single update tick takes.
    pub(crate) delta_time: f32,
    /// Smoothed frames per second for the render tick.
    pub(crate) frames_per_second: f32,
    /// Whether the game loop should stop.
    pub(crate) exit: bool,
}
