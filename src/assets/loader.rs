//! Tiered asset loading with completion events.
//!
//! All declared assets are fetched concurrently on worker threads; the
//! results come back through a channel that is drained on the main thread
//! once per update tick. Because the tally only ever mutates during that
//! drain no locking is needed, and events observe a fixed order per result:
//! tally update, then completion check, then event dispatch.

use std::{
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use hashbrown::HashMap;
use miette::{Report, Result};

use super::{AssetDescriptor, AssetSource, Priority, Resource, Resources};

/// Event emitted while draining the loader.
pub enum LoaderEvent {
    /// A single asset failed to load.
    ///
    /// Non-fatal: the tier still completes, only this asset's resource stays
    /// unavailable.
    AssetError {
        /// The declaration that failed.
        asset: AssetDescriptor,
        /// What went wrong while fetching or decoding.
        error: Report,
    },
    /// Every asset of the tier has resolved, successfully or not.
    ///
    /// Fires exactly once per declared tier.
    TierComplete {
        /// The tier that finished.
        tier: Priority,
        /// All declarations of that tier.
        assets: Vec<AssetDescriptor>,
    },
    /// Every declared tier has completed.
    ///
    /// Fires exactly once.
    AllComplete,
}

/// What a worker thread sends back for one asset.
struct WorkerResult {
    /// The declaration that was fetched.
    descriptor: AssetDescriptor,
    /// The decoded resource or the load failure.
    outcome: Result<Resource>,
}

/// Per-tier progress record.
struct Tier {
    /// All declarations of the tier.
    assets: Vec<AssetDescriptor>,
    /// How many of them have resolved, successfully or not.
    resolved: usize,
    /// Whether the tier-complete event has already fired.
    complete: bool,
}

/// Loads a fixed list of declared assets grouped by priority tier.
///
/// Owns all tally state; nothing here is shared or static.
pub struct TieredLoader {
    /// Progress per declared tier.
    tiers: HashMap<Priority, Tier>,
    /// Receiving end of the worker results.
    receiver: Receiver<WorkerResult>,
    /// Whether the all-complete event has already fired.
    all_complete_fired: bool,
}

impl TieredLoader {
    /// Start loading all declared assets.
    ///
    /// Spawns one worker per asset immediately; the order in which tiers
    /// resolve is unspecified, completion is signaled per tier through
    /// [`TieredLoader::poll`].
    #[must_use]
    pub fn spawn(descriptors: Vec<AssetDescriptor>, source: AssetSource) -> Self {
        let (loader, sender) = Self::with_channel(&descriptors);

        for descriptor in descriptors {
            let sender = sender.clone();
            let source = source.clone();

            thread::Builder::new()
                .name(format!("asset-{}", descriptor.id))
                .spawn(move || {
                    let outcome = source.fetch(&descriptor);

                    // A dropped receiver just means nobody is interested anymore
                    let _ = sender.send(WorkerResult { descriptor, outcome });
                })
                .expect("Error spawning asset worker thread");
        }

        loader
    }

    /// Create the loader bookkeeping plus the channel workers report into.
    fn with_channel(descriptors: &[AssetDescriptor]) -> (Self, Sender<WorkerResult>) {
        let mut tiers: HashMap<Priority, Tier> = HashMap::new();
        for descriptor in descriptors {
            tiers
                .entry(descriptor.priority)
                .or_insert_with(|| Tier {
                    assets: Vec::new(),
                    resolved: 0,
                    complete: false,
                })
                .assets
                .push(descriptor.clone());
        }

        let (sender, receiver) = channel();

        // With no declared assets there is nothing to wait for
        let all_complete_fired = false;

        (
            Self {
                tiers,
                receiver,
                all_complete_fired,
            },
            sender,
        )
    }

    /// Drain all results that arrived since the last poll.
    ///
    /// Successfully decoded resources are moved into `resources`; the
    /// returned events preserve arrival order, with an asset's error event
    /// preceding the completion event of its tier.
    pub fn poll(&mut self, resources: &mut Resources) -> Vec<LoaderEvent> {
        let mut events = Vec::new();

        while let Ok(WorkerResult { descriptor, outcome }) = self.receiver.try_recv() {
            let Some(tier) = self.tiers.get_mut(&descriptor.priority) else {
                // Can't happen, every worker was spawned from a declared tier
                continue;
            };

            // Count the asset as resolved whether it loaded or not
            tier.resolved += 1;

            match outcome {
                Ok(resource) => {
                    resources.insert(descriptor.id.clone(), resource);
                }
                Err(error) => events.push(LoaderEvent::AssetError {
                    asset: descriptor.clone(),
                    error,
                }),
            }

            // Check for tier completion after the tally update
            if tier.resolved == tier.assets.len() && !tier.complete {
                tier.complete = true;

                events.push(LoaderEvent::TierComplete {
                    tier: descriptor.priority,
                    assets: tier.assets.clone(),
                });

                if !self.all_complete_fired && self.tiers.values().all(|tier| tier.complete) {
                    self.all_complete_fired = true;

                    events.push(LoaderEvent::AllComplete);
                }
            }
        }

        events
    }

    /// Whether every declared tier has completed.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.all_complete_fired
    }
}
