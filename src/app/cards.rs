//! The card-shuffle mode.

use glam::Vec2;

use crate::{
    assets::{AssetId, Resources},
    canvas::Canvas,
    tween::{Easing, Tween},
};

/// How many cards are in the deck.
pub const CARD_COUNT: usize = 144;

/// Diagonal offset between two stacked cards in pixels.
const STACK_STEP: f32 = 1.0 / 6.0;

/// Top-left card of the stack relative to the container center.
const STACK_ORIGIN: Vec2 = Vec2::new(-133.0, -67.0);

/// How far each card travels to the second stack in pixels.
const SHUFFLE_SHIFT: f32 = 200.0;

/// Seconds between two consecutive cards starting to move.
const STAGGER_SECS: f32 = 0.08;

/// Seconds a single card travels.
const MOVE_SECS: f32 = 2.0;

/// Seconds a single card's draw order migrates.
const DEPTH_SECS: f32 = 1.0;

/// A deck of cards moving one by one onto a second stack, re-sorting their
/// draw order mid-flight so the deck ends up reversed.
pub struct CardMode {
    /// Container center in buffer pixels.
    position: Vec2,
    /// Sprite all cards are drawn with.
    sprite: AssetId,
    /// The deck in creation order, bottom card first.
    cards: Vec<Card>,
}

/// A single animated card.
struct Card {
    /// Horizontal position relative to the container, animated.
    x: Tween,
    /// Vertical position relative to the container, fixed.
    y: f32,
    /// Draw order, animated; higher values draw on top.
    depth: Tween,
}

impl CardMode {
    /// Build the stacked deck with its staggered shuffle animation.
    #[must_use]
    pub fn new(position: Vec2, sprite: AssetId) -> Self {
        let cards = (0..CARD_COUNT)
            .map(|index| {
                let start = STACK_ORIGIN + Vec2::splat(index as f32 * STACK_STEP);

                // The top of the stack moves first
                let delay = (CARD_COUNT - index) as f32 * STAGGER_SECS;

                // Draw order flips while moving so the new stack is reversed
                let depth_target = (5 * (CARD_COUNT - index)) as f32;

                Card {
                    x: Tween::new(start.x, start.x + SHUFFLE_SHIFT, MOVE_SECS)
                        .with_delay(delay)
                        .with_easing(Easing::OutQuad),
                    y: start.y,
                    depth: Tween::new(index as f32, depth_target, DEPTH_SECS).with_delay(delay),
                }
            })
            .collect();

        Self {
            position,
            sprite,
            cards,
        }
    }

    /// Move the container, all cards travel along.
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

    /// Advance all card animations.
    pub fn update(&mut self, delta_time: f32) {
        for card in &mut self.cards {
            card.x.advance(delta_time);
            card.depth.advance(delta_time);
        }
    }

    /// Whether every card has arrived on the second stack.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.cards.iter().all(|card| card.x.finished())
    }

    /// Draw the deck, skipped entirely when the sprite failed to load.
    pub fn draw(&self, canvas: &mut Canvas, resources: &Resources) {
        let Some(sprite) = resources.sprite(&self.sprite) else {
            return;
        };

        for index in self.depth_order() {
            let card = &self.cards[index];

            sprite.draw(canvas, self.position + Vec2::new(card.x.value(), card.y));
        }
    }

    /// Card indices sorted back-to-front by their current draw order.
    pub(crate) fn depth_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cards.len()).collect();
        order.sort_by(|a, b| {
            self.cards[*a]
                .depth
                .value()
                .total_cmp(&self.cards[*b].depth.value())
        });

        order
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use smol_str::SmolStr;

    use super::{CardMode, CARD_COUNT, SHUFFLE_SHIFT, STACK_ORIGIN};

    fn cards() -> CardMode {
        CardMode::new(Vec2::new(320.0, 180.0), SmolStr::new("card"))
    }

    #[test]
    fn deck_starts_stacked_in_creation_order() {
        let mode = cards();

        // Untouched, the draw order is simply the creation order
        let order = mode.depth_order();
        assert_eq!(order.first(), Some(&0));
        assert_eq!(order.last(), Some(&(CARD_COUNT - 1)));
        assert!(!mode.finished());
    }

    #[test]
    fn stagger_makes_the_top_card_move_first() {
        let mut mode = cards();

        // After the first stagger step only the top card has left the stack
        mode.update(0.3);
        let top = &mode.cards[CARD_COUNT - 1];
        let bottom = &mode.cards[0];

        assert!(top.x.value() > STACK_ORIGIN.x + (CARD_COUNT - 1) as f32 / 6.0);
        assert_eq!(bottom.x.value(), STACK_ORIGIN.x);
    }

    #[test]
    fn shuffle_ends_reversed_and_shifted() {
        let mut mode = cards();

        // Run the whole animation to the end
        for _ in 0..200 {
            mode.update(0.1);
        }

        assert!(mode.finished());

        // Every card arrived on the second stack
        for (index, card) in mode.cards.iter().enumerate() {
            let expected = STACK_ORIGIN.x + index as f32 / 6.0 + SHUFFLE_SHIFT;
            assert!((card.x.value() - expected).abs() < 1e-3);
        }

        // The deck is drawn in reverse: the old bottom card is now on top
        let order = mode.depth_order();
        assert_eq!(order.first(), Some(&(CARD_COUNT - 1)));
        assert_eq!(order.last(), Some(&0));
    }

    #[test]
    fn container_moves_without_touching_the_animation() {
        let mut mode = cards();
        mode.update(1.0);

        mode.set_position(Vec2::new(10.0, 10.0));
        assert_eq!(mode.position(), Vec2::new(10.0, 10.0));
    }
}
