#![forbid(unsafe_code)]

//! Interactive 2D demo built on a small buffer-upscale renderer.
//!
//! The crate opens a window, loads the assets declared in a TOML manifest in
//! priority tiers, and once the highest tier resolved presents a button bar
//! that switches between three visual modes:
//!
//! - A particle fire effect.
//! - A card-shuffling animation.
//! - Cycling random text/image banners.
//!
//! Everything is drawn on a CPU pixel buffer ([`Canvas`]) which is uploaded
//! to the GPU once per frame and scaled into the window with letterboxing.
//! Window resizes that flip the orientation swap the buffer dimensions and
//! reposition all live view elements.
//!
//! The demo state lives in [`app::Sideshow`]; run it with [`Game::run`]:
//!
//! ```no_run
//! use sideshow::{app::Sideshow, assets::{AssetSource, Manifest}, Config, Game};
//!
//! # fn try_main() -> miette::Result<()> {
//! let manifest = Manifest::from_path("assets/manifest.toml")?;
//! let game = Sideshow::new(manifest.assets, AssetSource::new("assets"), 0xFF008080);
//!
//! game.run(Config::default().with_title("Sideshow"))
//! # }
//! ```

pub mod app;
pub mod assets;
pub mod canvas;
pub mod config;
pub mod context;
pub mod font;
mod graphics;
pub mod gui;
pub mod sprite;
pub mod tween;
mod window;

pub use canvas::Canvas;
pub use config::Config;
pub use context::Context;
use miette::Result;
/// Mouse button type exposed to button handling.
pub use winit::event::MouseButton;
/// Key code type exposed to the update tick.
pub use winit::keyboard::KeyCode;

/// Main entrypoint containing the state for running the demo.
///
/// See [`Context`] for the functions interfacing with the window from the
/// callbacks.
pub trait Game: Sized
where
    Self: 'static,
{
    /// A single update tick in the game loop.
    ///
    /// Runs at the fixed rate configured with
    /// [`Config::with_updates_per_second`]; must be used for mutating the
    /// game state.
    fn update(&mut self, ctx: Context);

    /// A single render tick in the game loop.
    ///
    /// Draw the current state onto the canvas; the window layer uploads and
    /// presents it afterwards.
    fn render(&mut self, ctx: Context, canvas: &mut Canvas);

    /// Optionally implement this method to run a function at startup.
    ///
    /// Will run after the window is set up and the context is created.
    #[inline(always)]
    #[allow(unused_variables)]
    fn init(&mut self, ctx: Context) {}

    /// Called once when a burst of window resize events begins.
    #[inline(always)]
    #[allow(unused_variables)]
    fn resize_started(&mut self, ctx: Context) {}

    /// Called once when a burst of window resize events settled.
    ///
    /// When `orientation_changed` is `true` the logical buffer dimensions
    /// have already been swapped and live view elements should reposition
    /// themselves against the new [`Context::size`].
    #[inline(always)]
    #[allow(unused_variables)]
    fn resize_ended(&mut self, ctx: Context, orientation_changed: bool) {}

    /// Run the game, spawning the window.
    ///
    /// # Errors
    ///
    /// - When a window could not be opened.
    /// - If no GPU could be found or accessed.
    #[inline(always)]
    fn run(self, config: Config) -> Result<()> {
        window::run(self, config)
    }
}

/// Generate a random value within the given range.
///
/// Thin wrapper so call sites don't need to care about the RNG crate.
#[inline]
#[must_use]
pub fn random(min: f32, max: f32) -> f32 {
    fastrand::f32() * (max - min) + min
}
