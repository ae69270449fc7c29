//! Game configuration.

use glam::Vec2;

/// Initial demo configuration passed to [`crate::Game::run`].
///
/// # Example
///
/// ```rust
/// # use sideshow::Config;
/// Config::default()
///     .with_title("Sideshow")
///     .with_scaling(2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Amount of pixels for the canvas in landscape orientation.
    ///
    /// Defaults to `(640.0, 360.0)`.
    pub buffer_size: Vec2,
    /// Factor applied to the buffer size for the requested window size.
    ///
    /// Defaults to `1.0`.
    pub scaling: f32,
    /// Name in the title bar.
    ///
    /// Defaults to `"Sideshow"`.
    pub title: String,
    /// Updates per second for the fixed-timestep update loop.
    ///
    /// Defaults to `60`.
    pub updates_per_second: u32,
    /// Color of the viewport, the area outside of the letterboxed buffer.
    ///
    /// Defaults to `0xFF101010` (almost black).
    pub viewport_color: u32,
    /// Color the canvas is cleared with every frame.
    ///
    /// Defaults to `0xFF008080` (teal).
    pub background_color: u32,
    /// Whether to wait for vertical sync when presenting.
    ///
    /// Defaults to `true`.
    pub vsync: bool,
}

impl Config {
    /// Set the amount of pixels for the canvas in landscape orientation.
    #[must_use]
    pub const fn with_buffer_size(mut self, width: f32, height: f32) -> Self {
        self.buffer_size = Vec2::new(width, height);

        self
    }

    /// Set the factor applied to the buffer size for the requested window size.
    #[must_use]
    pub const fn with_scaling(mut self, scaling: f32) -> Self {
        self.scaling = scaling;

        self
    }

    /// Set the name in the title bar.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();

        self
    }

    /// Set the updates per second for the fixed-timestep update loop.
    #[must_use]
    pub const fn with_updates_per_second(mut self, updates_per_second: u32) -> Self {
        self.updates_per_second = updates_per_second;

        self
    }

    /// Set the color of the viewport outside of the letterboxed buffer.
    #[must_use]
    pub const fn with_viewport_color(mut self, viewport_color: u32) -> Self {
        self.viewport_color = viewport_color;

        self
    }

    /// Set the color the canvas is cleared with every frame.
    #[must_use]
    pub const fn with_background_color(mut self, background_color: u32) -> Self {
        self.background_color = background_color;

        self
    }

    /// Set whether to wait for vertical sync when presenting.
    #[must_use]
    pub const fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;

        self
    }

    /// Seconds a single update tick takes.
    #[must_use]
    pub fn update_delta_time(&self) -> f32 {
        (self.updates_per_second as f32).recip()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: Vec2::new(640.0, 360.0),
            scaling: 1.0,
            title: "Sideshow".to_string(),
            updates_per_second: 60,
            viewport_color: 0xFF101010,
            background_color: 0xFF008080,
            vsync: true,
        }
    }
}
