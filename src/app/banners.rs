//! The cycling text/image banner mode.

use glam::Vec2;

use crate::{
    assets::{AssetId, Resources},
    canvas::Canvas,
    random,
};

/// How many banner slots are shown side by side.
const SLOT_COUNT: usize = 5;

/// Horizontal gap between two slots in pixels.
const SLOT_GAP: f32 = 4.0;

/// Seconds between two rebuilds of the banner row.
const CYCLE_SECS: f32 = 2.0;

/// Id of the bitmap font the words are drawn with.
const FONT: &str = "banner_font";

/// Words a text slot picks from.
const WORDS: [&str; 13] = [
    "Apple", "Beer", "Leader", "Smiles", "Music", "Fast", "Player", "Zodiac", "Empire", "Moon",
    "Futball", "Energy", "Lands",
];

/// Images an image slot picks from.
const IMAGES: [&str; 8] = [
    "banner1", "banner2", "banner3", "banner4", "banner5", "banner6", "banner7", "banner8",
];

/// Random text scale range per slot position.
const SLOT_SCALE_RANGES: [(f32, f32); SLOT_COUNT] = [
    (0.9, 1.1),
    (1.25, 2.1),
    (1.0, 2.1),
    (1.0, 1.25),
    (1.5, 1.6),
];

/// Text color of the words.
const TEXT_TINT: [f32; 3] = [0.0, 0.0, 0.0];

/// A row of five random banners, fully rebuilt on a fixed interval.
///
/// The interval timer is owned by the mode, so switching away drops it and
/// no callback can outlive the container it mutates.
pub struct BannerMode {
    /// Container center in buffer pixels.
    position: Vec2,
    /// The current row, left to right.
    slots: Vec<Slot>,
    /// Rebuild timer.
    timer: Interval,
}

/// A single banner laid out in the row.
struct Slot {
    /// What the slot shows.
    content: SlotContent,
    /// Horizontal slot center relative to the container.
    center_x: f32,
    /// Measured width in pixels.
    width: f32,
}

/// What a slot shows.
enum SlotContent {
    /// A random word at a random scale.
    Word {
        /// The word itself.
        text: &'static str,
        /// Text scale factor.
        scale: f32,
    },
    /// One of the banner images.
    Image {
        /// Sprite id.
        id: AssetId,
    },
}

impl BannerMode {
    /// Build a fresh row at the position.
    #[must_use]
    pub fn new(position: Vec2, resources: &Resources) -> Self {
        Self {
            position,
            slots: build_slots(resources),
            timer: Interval::new(CYCLE_SECS),
        }
    }

    /// Move the container, the slots travel along.
    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Container center in buffer pixels.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Advance the rebuild timer, replacing all slots when it fires.
    pub fn update(&mut self, delta_time: f32, resources: &Resources) {
        if self.timer.tick(delta_time) {
            self.slots = build_slots(resources);
        }
    }

    /// Draw the row; slots whose asset failed to load are skipped.
    pub fn draw(&self, canvas: &mut Canvas, resources: &Resources) {
        for slot in &self.slots {
            let center = self.position + Vec2::new(slot.center_x, 0.0);

            match &slot.content {
                SlotContent::Word { text, scale } => {
                    if let Some(font) = resources.font(FONT) {
                        font.draw(canvas, center, text, *scale, TEXT_TINT);
                    }
                }
                SlotContent::Image { id } => {
                    if let Some(sprite) = resources.sprite(id) {
                        sprite.draw(canvas, center);
                    }
                }
            }
        }
    }
}

/// Roll five random slots and lay them out around the center one.
fn build_slots(resources: &Resources) -> Vec<Slot> {
    let mut slots: Vec<Slot> = (0..SLOT_COUNT)
        .map(|index| {
            // Roughly every third slot shows an image instead of a word
            let content = if fastrand::usize(..3) == 1 {
                SlotContent::Image {
                    id: AssetId::new(IMAGES[fastrand::usize(..IMAGES.len())]),
                }
            } else {
                let (min, max) = SLOT_SCALE_RANGES[index];

                SlotContent::Word {
                    text: WORDS[fastrand::usize(..WORDS.len())],
                    scale: random(min, max),
                }
            };

            Slot {
                width: measure(&content, resources),
                content,
                center_x: 0.0,
            }
        })
        .collect();

    // The middle slot anchors the row, the others chain off it by their
    // measured widths
    slots[2].center_x = 0.0;
    slots[1].center_x = -(slots[2].width / 2.0 + slots[1].width / 2.0 + SLOT_GAP);
    slots[0].center_x = slots[1].center_x - slots[1].width / 2.0 - slots[0].width / 2.0 - SLOT_GAP;
    slots[3].center_x = slots[2].width / 2.0 + slots[3].width / 2.0 + SLOT_GAP;
    slots[4].center_x = slots[3].center_x + slots[3].width / 2.0 + slots[4].width / 2.0 + SLOT_GAP;

    slots
}

/// Measured width of a slot's content, zero when its asset is unavailable.
fn measure(content: &SlotContent, resources: &Resources) -> f32 {
    match content {
        SlotContent::Word { text, scale } => resources
            .font(FONT)
            .map_or(0.0, |font| font.measure(text, *scale)),
        SlotContent::Image { id } => resources.sprite(id).map_or(0.0, |sprite| sprite.size().x),
    }
}

/// A repeating fixed-interval timer driven by the update tick.
pub(crate) struct Interval {
    /// Seconds between two firings.
    period: f32,
    /// Accumulated seconds since the last firing.
    elapsed: f32,
}

impl Interval {
    /// Create a timer firing every `period` seconds.
    pub(crate) fn new(period: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
        }
    }

    /// Advance the timer, returning `true` at most once per call when the
    /// period elapsed.
    pub(crate) fn tick(&mut self, delta_time: f32) -> bool {
        self.elapsed += delta_time;

        if self.elapsed >= self.period {
            self.elapsed -= self.period;

            true
        } else {
            false
        }
    }
}
