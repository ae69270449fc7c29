//! Spawn a winit window and run the game loop.

use std::sync::Arc;

use glam::Vec2;
use miette::{IntoDiagnostic, Result, WrapErr};
use web_time::Instant;
use winit::{
    dpi::LogicalSize,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};
use winit_input_helper::WinitInputHelper;

use crate::{canvas::Canvas, config::Config, context::Context, graphics::Graphics, Game};

/// How fast old FPS values decay in the smoothed average.
const FPS_SMOOTHED_AVERAGE_ALPHA: f32 = 0.8;

/// Seconds a single frametime may never surpass for the update accumulator.
const MAX_FRAME_TIME_SECS: f32 = 0.25;

/// Seconds without a resize event before the burst counts as settled.
const RESIZE_SETTLE_SECS: f32 = 0.25;

/// Smallest allowed window edge in logical pixels.
const MIN_WINDOW_SIZE: f32 = 160.0;

/// Create a new window with an event loop and run the game.
pub(crate) fn run<G: Game>(game: G, config: Config) -> Result<()> {
    // Enable environment logger for the whole application
    env_logger::init();

    let event_loop = EventLoop::new()
        .into_diagnostic()
        .wrap_err("Error setting up event loop for window")?;

    // Build the window, applying scaling for the requested size
    let window_builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(
            config.buffer_size.x * config.scaling,
            config.buffer_size.y * config.scaling,
        ))
        // Leave room to rotate into portrait, but not to collapse the window
        .with_min_inner_size(LogicalSize::new(MIN_WINDOW_SIZE, MIN_WINDOW_SIZE));

    let window = window_builder
        .build(&event_loop)
        .into_diagnostic()
        .wrap_err("Error setting up window")?;

    pollster::block_on(winit_start(event_loop, window, game, config))
}

/// State of an ongoing burst of resize events.
struct ResizeTracker {
    /// When the last resize event of the burst arrived.
    last_event: Instant,
    /// Whether the window was portrait before the burst started.
    was_portrait: bool,
}

/// Open a winit window with an event loop.
async fn winit_start<G: Game>(
    event_loop: EventLoop<()>,
    window: Window,
    mut game: G,
    config: Config,
) -> Result<()> {
    // Wrap the window in an atomic reference counter so it can be shared
    let window = Arc::new(window);

    // Setup the winit input helper state
    let mut input = WinitInputHelper::new();

    // Create a surface on the window and setup the render state to it
    let mut graphics = Graphics::new(&config, Arc::clone(&window))
        .await
        .wrap_err("Error setting up the rendering pipeline")?;

    let (buffer_width, buffer_height) = graphics.buffer_size();
    let mut canvas = Canvas::new(buffer_width, buffer_height);

    // Setup the context passed to the game callbacks
    let ctx = Context::new(&config, Arc::clone(&window));

    // Setup the timestep variables for the update loop
    let update_delta_time = config.update_delta_time();
    let mut accumulator = 0.0_f32;
    let mut last_time = Instant::now();

    // No resize burst is active yet
    let mut resize: Option<ResizeTracker> = None;

    // Call user passed init function
    game.init(ctx.clone());

    log::debug!("Opening window with game loop");

    event_loop
        .run(move |event, elwt| {
            // Keep polling so new frames are drawn without waiting for events
            elwt.set_control_flow(ControlFlow::Poll);

            // Pass every event to the input helper, when it returns `true`
            // it's time to run the logic
            if !input.update(&event) {
                return;
            }

            // Exit when the window is destroyed or closed
            if input.close_requested() || input.destroyed() || ctx.read(|ctx| ctx.exit) {
                elwt.exit();

                return;
            }

            // Resize the render surface when the window is resized
            if let Some(new_size) = input.window_resized() {
                match &mut resize {
                    None => {
                        // A new burst starts, remember which way the window pointed
                        let was_portrait = graphics.screen_is_portrait();

                        game.resize_started(ctx.clone());

                        resize = Some(ResizeTracker {
                            last_event: Instant::now(),
                            was_portrait,
                        });
                    }
                    Some(tracker) => tracker.last_event = Instant::now(),
                }

                graphics.resize(new_size.width, new_size.height);

                // On MacOS the window needs to be redrawn manually after resizing
                window.request_redraw();
            }

            // When a burst settled, check whether the orientation flipped
            let settled = resize.as_ref().map_or(false, |tracker| {
                tracker.last_event.elapsed().as_secs_f32() >= RESIZE_SETTLE_SECS
            });
            if settled {
                if let Some(tracker) = resize.take() {
                    let orientation_changed =
                        graphics.screen_is_portrait() != tracker.was_portrait;

                    if orientation_changed {
                        // Flip the logical buffer so the layout can follow
                        graphics.swap_orientation();

                        let (width, height) = graphics.buffer_size();
                        canvas.resize(width, height);
                        ctx.write(|ctx| {
                            ctx.buffer_size = Vec2::new(width as f32, height as f32);
                        });
                    }

                    game.resize_ended(ctx.clone(), orientation_changed);
                }
            }

            // Update the timestep
            let current_time = Instant::now();
            let frame_time = (current_time - last_time)
                .as_secs_f32()
                // Ensure the frametime will never surpass this amount
                .min(MAX_FRAME_TIME_SECS);
            last_time = current_time;
            accumulator += frame_time;

            // Set the updated state for the context
            ctx.write(|ctx| {
                // Map the mouse position into the letterboxed buffer
                ctx.mouse = input
                    .cursor()
                    .and_then(|(x, y)| graphics.map_coordinate(Vec2::new(x, y)));

                // Embed the input
                // TODO: remove clone
                ctx.input = input.clone();
            });

            {
                profiling::scope!("Update");

                // Call the user update function with the context
                while accumulator >= update_delta_time {
                    game.update(ctx.clone());

                    accumulator -= update_delta_time;
                }
            }

            // Set the FPS with a smoothed average function
            if frame_time > 0.0 {
                ctx.write(|ctx| {
                    ctx.frames_per_second = FPS_SMOOTHED_AVERAGE_ALPHA.mul_add(
                        ctx.frames_per_second,
                        (1.0 - FPS_SMOOTHED_AVERAGE_ALPHA) * frame_time.recip(),
                    );
                });
            }

            {
                profiling::scope!("Render");

                // Call the user render function and present the canvas
                game.render(ctx.clone(), &mut canvas);
                graphics.render(&canvas);
            }

            // Tell the profiler we've executed a tick
            profiling::finish_frame!();
        })
        .into_diagnostic()
        .wrap_err("Error running game loop")?;

    Ok(())
}
