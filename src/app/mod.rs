//! The demo application: view activation, button wiring, mode switching and
//! resize relocation.

pub mod banners;
pub mod cards;
pub mod fire;

use glam::Vec2;

use crate::{
    assets::{AssetDescriptor, AssetSource, LoaderEvent, Priority, Resources, TieredLoader},
    canvas::Canvas,
    gui::Button,
    Context, Game, KeyCode,
};

use banners::BannerMode;
use cards::CardMode;
use fire::FireMode;

/// Horizontal gap between the mode buttons in pixels.
const BUTTON_GAP: f32 = 8.0;

/// The three interactive modes behind the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The card-shuffle animation.
    Cards,
    /// The cycling text/image banners.
    Text,
    /// The particle fire.
    Fire,
}

/// What a released button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonAction {
    /// The start/fullscreen button.
    Start,
    /// One of the three mode buttons.
    Switch(Mode),
}

/// The demo application state.
///
/// All view elements are lazily created `Option`s: the button bar is gated
/// on the highest asset tier, the mode views on button presses. Everything
/// that touches them checks for existence first.
pub struct Sideshow {
    /// Loader feeding [`Self::resources`].
    loader: TieredLoader,
    /// Everything that loaded so far.
    resources: Resources,
    /// Color the canvas is cleared with.
    background_color: u32,
    /// The button bar, built when the highest tier completes.
    buttons: Option<ButtonBar>,
    /// The card-shuffle view, while active.
    cards: Option<CardMode>,
    /// The banner view, while active. Owns the cycle timer.
    banners: Option<BannerMode>,
    /// The fire view, while active.
    fire: Option<FireMode>,
}

impl Sideshow {
    /// Start loading the declared assets and set up the empty stage.
    #[must_use]
    pub fn new(
        descriptors: Vec<AssetDescriptor>,
        source: AssetSource,
        background_color: u32,
    ) -> Self {
        let loader = TieredLoader::spawn(descriptors, source);

        Self {
            loader,
            resources: Resources::default(),
            background_color,
            buttons: None,
            cards: None,
            banners: None,
            fire: None,
        }
    }

    /// Build the view elements gated on a freshly completed tier.
    ///
    /// Idempotent: a tier that already constructed its views leaves them
    /// untouched.
    fn activate_tier(&mut self, tier: Priority, width: f32, height: f32) {
        if tier == Priority::Highest && self.buttons.is_none() {
            let mut bar = ButtonBar::new(&self.resources);
            bar.layout(width, height);

            self.buttons = Some(bar);
        }
    }

    /// Tear down the previous mode and construct the chosen one.
    ///
    /// Dropping the banner view cancels its cycle timer with it.
    fn switch_mode(&mut self, mode: Mode, width: f32, height: f32) {
        self.cards = None;
        self.banners = None;
        self.fire = None;

        let center = Vec2::new(width / 2.0, height / 2.0);
        match mode {
            Mode::Cards => self.cards = Some(CardMode::new(center, "card".into())),
            Mode::Text => self.banners = Some(BannerMode::new(center, &self.resources)),
            Mode::Fire => {
                // Fall back to the built-in emitter when the tuned settings
                // of the lowest tier didn't load
                let settings = self
                    .resources
                    .particle_settings("flame")
                    .cloned()
                    .unwrap_or_default();

                self.fire = Some(FireMode::new(
                    Vec2::new(width / 2.0, height),
                    "infire".into(),
                    settings,
                ));
            }
        }

        log::info!("Switched to {mode:?} mode");
    }

    /// Reposition every currently existing view element against new buffer
    /// dimensions; elements that don't exist yet are skipped.
    fn relocate(&mut self, width: f32, height: f32) {
        let center = Vec2::new(width / 2.0, height / 2.0);

        if let Some(buttons) = &mut self.buttons {
            buttons.layout(width, height);
        }
        if let Some(cards) = &mut self.cards {
            cards.set_position(center);
        }
        if let Some(banners) = &mut self.banners {
            banners.set_position(center);
        }
        if let Some(fire) = &mut self.fire {
            fire.set_position(Vec2::new(width / 2.0, height));
        }
    }

    /// React to a released button.
    fn on_button(&mut self, action: ButtonAction, ctx: &Context, width: f32, height: f32) {
        let Some(buttons) = &mut self.buttons else {
            return;
        };

        match action {
            ButtonAction::Start => {
                buttons.reveal_modes();
                ctx.toggle_fullscreen();
            }
            ButtonAction::Switch(mode) => {
                buttons.mark_active(mode);
                self.switch_mode(mode, width, height);
            }
        }
    }

    /// How many periodic timers are currently alive.
    ///
    /// Only the banner mode owns one, so this can never exceed one.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        usize::from(self.banners.is_some())
    }
}

impl Game for Sideshow {
    fn update(&mut self, ctx: Context) {
        let (width, height) = ctx.size();

        // Drain the loader, firing view activation per completed tier
        for event in self.loader.poll(&mut self.resources) {
            match event {
                LoaderEvent::TierComplete { tier, assets } => {
                    log::info!("Tier '{tier}' completed with {} assets", assets.len());

                    self.activate_tier(tier, width, height);
                }
                LoaderEvent::AssetError { asset, error } => {
                    // Non-fatal, the resource simply stays unavailable
                    log::error!("Error loading asset '{}': {error}", asset.id);
                }
                LoaderEvent::AllComplete => log::info!("All assets resolved"),
            }
        }

        // Handle the button bar
        let action = self
            .buttons
            .as_mut()
            .and_then(|buttons| buttons.update(&ctx));
        if let Some(action) = action {
            self.on_button(action, &ctx, width, height);
        }

        // Advance whichever mode is active
        let delta_time = ctx.delta_time();
        if let Some(cards) = &mut self.cards {
            cards.update(delta_time);
        }
        if let Some(banners) = &mut self.banners {
            banners.update(delta_time, &self.resources);
        }
        if let Some(fire) = &mut self.fire {
            fire.update(delta_time);
        }

        if ctx.key_pressed(KeyCode::Escape) {
            ctx.exit();
        }
    }

    fn render(&mut self, _ctx: Context, canvas: &mut Canvas) {
        canvas.fill(self.background_color);

        if let Some(cards) = &self.cards {
            cards.draw(canvas, &self.resources);
        }
        if let Some(banners) = &self.banners {
            banners.draw(canvas, &self.resources);
        }
        if let Some(fire) = &self.fire {
            fire.draw(canvas, &self.resources);
        }
        if let Some(buttons) = &self.buttons {
            buttons.draw(canvas, &self.resources);
        }
    }

    fn resize_started(&mut self, _ctx: Context) {
        log::debug!("Resize started");
    }

    fn resize_ended(&mut self, ctx: Context, orientation_changed: bool) {
        log::debug!("Resize ended, orientation changed: {orientation_changed}");

        if orientation_changed {
            let (width, height) = ctx.size();
            self.relocate(width, height);
        }
    }
}

/// The four demo buttons and their enable/opacity choreography.
struct ButtonBar {
    /// Start/fullscreen button, visible first.
    start: Button,
    /// Switches to the card-shuffle mode.
    card: Button,
    /// Switches to the banner mode.
    text: Button,
    /// Switches to the fire mode.
    fire: Button,
}

impl ButtonBar {
    /// Build the bar in its initial state: only the start button usable.
    fn new(resources: &Resources) -> Self {
        let start = Button::new("start".into(), "start_hover".into(), resources);

        let mut card = Button::new("card_btn".into(), "card_btn_hover".into(), resources);
        let mut text = Button::new("text_btn".into(), "text_btn_hover".into(), resources);
        let mut fire = Button::new("fire_btn".into(), "fire_btn_hover".into(), resources);

        // The mode buttons appear once start is pressed
        for button in [&mut card, &mut text, &mut fire] {
            button.enabled = false;
            button.alpha = 0.0;
        }

        Self {
            start,
            card,
            text,
            fire,
        }
    }

    /// Position the buttons as fractions of the buffer dimensions.
    ///
    /// The mode buttons flank the text button, offset by its measured width.
    fn layout(&mut self, width: f32, height: f32) {
        self.start.position = Vec2::new(width / 2.0, height / 1.2);

        let row_y = height / 8.0;
        let offset = self.text.size.x + BUTTON_GAP;

        self.text.position = Vec2::new(width / 2.0, row_y);
        self.card.position = Vec2::new(width / 2.0 - offset, row_y);
        self.fire.position = Vec2::new(width / 2.0 + offset, row_y);
    }

    /// Handle the pointer for one tick, reporting at most one release.
    fn update(&mut self, ctx: &Context) -> Option<ButtonAction> {
        if self.start.update(ctx) {
            return Some(ButtonAction::Start);
        }
        if self.card.update(ctx) {
            return Some(ButtonAction::Switch(Mode::Cards));
        }
        if self.text.update(ctx) {
            return Some(ButtonAction::Switch(Mode::Text));
        }
        if self.fire.update(ctx) {
            return Some(ButtonAction::Switch(Mode::Fire));
        }

        None
    }

    /// Hide the start button and enable the three mode buttons.
    fn reveal_modes(&mut self) {
        self.start.enabled = false;
        self.start.visible = false;

        for button in [&mut self.card, &mut self.text, &mut self.fire] {
            button.enabled = true;
            button.alpha = 1.0;
        }
    }

    /// Dim and disable the active mode's button, restore its siblings.
    fn mark_active(&mut self, mode: Mode) {
        let buttons = [
            (&mut self.card, Mode::Cards),
            (&mut self.text, Mode::Text),
            (&mut self.fire, Mode::Fire),
        ];

        for (button, button_mode) in buttons {
            let active = button_mode == mode;

            button.enabled = !active;
            button.alpha = if active { 0.5 } else { 1.0 };
        }
    }

    /// Render all visible buttons.
    fn draw(&self, canvas: &mut Canvas, resources: &Resources) {
        self.start.draw(canvas, resources);
        self.card.draw(canvas, resources);
        self.text.draw(canvas, resources);
        self.fire.draw(canvas, resources);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{ButtonBar, Mode, Sideshow, BUTTON_GAP};
    use crate::{
        assets::{AssetSource, Priority, Resource, Resources},
        sprite::Sprite,
    };

    /// App with no declared assets and nothing loaded.
    fn app() -> Sideshow {
        Sideshow::new(Vec::new(), AssetSource::new("unused"), 0xFF008080)
    }

    /// Resources holding sized button art.
    fn button_resources() -> Resources {
        let mut resources = Resources::default();

        for (id, width) in [
            ("start", 60),
            ("start_hover", 60),
            ("card_btn", 40),
            ("card_btn_hover", 40),
            ("text_btn", 40),
            ("text_btn_hover", 40),
            ("fire_btn", 40),
            ("fire_btn_hover", 40),
        ] {
            resources.insert(
                id.into(),
                Resource::Sprite(Sprite::from_pixels(width, 16, vec![0; (width * 16) as usize])),
            );
        }

        resources
    }

    #[test]
    fn at_most_one_timer_across_mode_switches() {
        let mut app = app();

        assert_eq!(app.active_timers(), 0);

        app.switch_mode(Mode::Cards, 640.0, 360.0);
        assert_eq!(app.active_timers(), 0);

        app.switch_mode(Mode::Text, 640.0, 360.0);
        assert_eq!(app.active_timers(), 1);

        app.switch_mode(Mode::Fire, 640.0, 360.0);
        assert_eq!(app.active_timers(), 0);

        app.switch_mode(Mode::Cards, 640.0, 360.0);
        assert_eq!(app.active_timers(), 0);
    }

    #[test]
    fn switching_tears_down_the_previous_mode() {
        let mut app = app();

        app.switch_mode(Mode::Cards, 640.0, 360.0);
        assert!(app.cards.is_some());

        app.switch_mode(Mode::Text, 640.0, 360.0);
        assert!(app.cards.is_none());
        assert!(app.banners.is_some());

        app.switch_mode(Mode::Fire, 640.0, 360.0);
        assert!(app.banners.is_none());
        assert!(app.fire.is_some());
    }

    #[test]
    fn tier_activation_is_idempotent() {
        let mut app = app();
        app.resources = button_resources();

        app.activate_tier(Priority::Highest, 640.0, 360.0);
        assert!(app.buttons.is_some());

        // Mark the existing bar, a second activation must not rebuild it
        app.buttons.as_mut().unwrap().start.alpha = 0.33;
        app.activate_tier(Priority::Highest, 640.0, 360.0);
        assert_eq!(app.buttons.as_ref().unwrap().start.alpha, 0.33);
    }

    #[test]
    fn other_tiers_gate_no_views() {
        let mut app = app();

        app.activate_tier(Priority::Lowest, 640.0, 360.0);
        assert!(app.buttons.is_none());
    }

    #[test]
    fn relocation_skips_missing_elements() {
        let mut app = app();

        // Nothing exists yet, must not panic
        app.relocate(360.0, 640.0);
        assert!(app.buttons.is_none());
    }

    #[test]
    fn relocation_follows_the_fractional_layout() {
        let mut app = app();
        app.resources = button_resources();

        app.activate_tier(Priority::Highest, 640.0, 360.0);
        app.switch_mode(Mode::Cards, 640.0, 360.0);

        // Simulate an orientation flip to portrait
        app.relocate(360.0, 640.0);

        let buttons = app.buttons.as_ref().unwrap();
        assert_eq!(buttons.start.position, Vec2::new(180.0, 640.0 / 1.2));
        assert_eq!(buttons.text.position, Vec2::new(180.0, 80.0));
        assert_eq!(app.cards.as_ref().unwrap().position(), Vec2::new(180.0, 320.0));
    }

    #[test]
    fn mode_buttons_flank_the_text_button_by_its_width() {
        let mut bar = ButtonBar::new(&button_resources());
        bar.layout(640.0, 360.0);

        let offset = bar.text.size.x + BUTTON_GAP;
        assert_eq!(bar.card.position.x, 320.0 - offset);
        assert_eq!(bar.fire.position.x, 320.0 + offset);
        assert_eq!(bar.card.position.y, bar.fire.position.y);
    }

    #[test]
    fn start_press_reveals_the_mode_buttons() {
        let mut bar = ButtonBar::new(&button_resources());

        assert!(!bar.card.enabled);
        assert_eq!(bar.card.alpha, 0.0);

        bar.reveal_modes();

        assert!(!bar.start.visible);
        assert!(bar.card.enabled && bar.text.enabled && bar.fire.enabled);
        assert_eq!(bar.card.alpha, 1.0);
    }

    #[test]
    fn active_mode_button_dims_and_disables() {
        let mut bar = ButtonBar::new(&button_resources());
        bar.reveal_modes();

        bar.mark_active(Mode::Text);
        assert!(!bar.text.enabled);
        assert_eq!(bar.text.alpha, 0.5);
        assert!(bar.card.enabled && bar.fire.enabled);
        assert_eq!(bar.card.alpha, 1.0);

        // Switching again restores the previous one
        bar.mark_active(Mode::Fire);
        assert!(bar.text.enabled);
        assert_eq!(bar.text.alpha, 1.0);
        assert!(!bar.fire.enabled);
    }
}
