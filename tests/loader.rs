//! End-to-end checks of the tiered loader against real files on disk.
//!
//! Every test synthesizes its own asset directory under the system temp dir,
//! spawns the loader on it and drains the events until the load settles.

use std::{
    io::BufWriter,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use sideshow::assets::{
    AssetSource, LoaderEvent, Manifest, Priority, Resources, TieredLoader,
};

/// Create a fresh asset directory for one test.
fn asset_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sideshow-{name}-{}", std::process::id()));

    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("gfx")).unwrap();

    dir
}

/// Write a small opaque PNG.
fn write_png(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().unwrap();
    writer
        .write_image_data(&vec![0x80; (width * height * 4) as usize])
        .unwrap();
}

/// Poll the loader until everything resolved, collecting all events.
fn drain(loader: &mut TieredLoader, resources: &mut Resources) -> Vec<LoaderEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();

    while !loader.finished() && Instant::now() < deadline {
        events.extend(loader.poll(resources));
        std::thread::sleep(Duration::from_millis(5));
    }

    // One more poll in case the last result and the deadline raced
    events.extend(loader.poll(resources));

    assert!(loader.finished(), "loader did not settle within the deadline");

    events
}

#[test]
fn manifest_load_fires_tiers_then_all_complete() {
    let dir = asset_dir("happy");
    write_png(&dir.join("gfx/infire.png"), 8, 8);
    write_png(&dir.join("gfx/card.png"), 57, 78);
    std::fs::write(dir.join("flame.toml"), "spawn_interval = 0.02\n").unwrap();

    let manifest = Manifest::from_str(
        r#"
        [[asset]]
        id = "infire"
        path = "gfx/infire.png"
        priority = "highest"
        kind = "texture"

        [[asset]]
        id = "card"
        path = "gfx/card.png"
        priority = "highest"
        kind = "texture"

        [[asset]]
        id = "flame"
        path = "flame.toml"
        priority = "lowest"
        kind = "particles"
        "#,
    )
    .unwrap();

    let mut resources = Resources::default();
    let mut loader = TieredLoader::spawn(manifest.assets, AssetSource::new(&dir));
    let events = drain(&mut loader, &mut resources);

    // No asset failed
    assert!(!events
        .iter()
        .any(|event| matches!(event, LoaderEvent::AssetError { .. })));

    // Each declared tier completed exactly once, the highest with both assets
    let completions: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            LoaderEvent::TierComplete { tier, assets } => Some((*tier, assets.len())),
            _ => None,
        })
        .collect();
    assert_eq!(completions.len(), 2);
    assert!(completions.contains(&(Priority::Highest, 2)));
    assert!(completions.contains(&(Priority::Lowest, 1)));

    // All-complete fired exactly once, after everything else
    let all_complete = events
        .iter()
        .filter(|event| matches!(event, LoaderEvent::AllComplete))
        .count();
    assert_eq!(all_complete, 1);
    assert!(matches!(events.last(), Some(LoaderEvent::AllComplete)));

    // Every resource is usable
    assert_eq!(resources.sprite("infire").unwrap().width(), 8);
    assert_eq!(resources.sprite("card").unwrap().width(), 57);
    assert_eq!(
        resources.particle_settings("flame").unwrap().spawn_interval,
        0.02
    );
}

#[test]
fn missing_file_errors_but_the_tier_still_completes() {
    let dir = asset_dir("missing");
    write_png(&dir.join("gfx/good.png"), 4, 4);

    let manifest = Manifest::from_str(
        r#"
        [[asset]]
        id = "good"
        path = "gfx/good.png"
        priority = "highest"
        kind = "texture"

        [[asset]]
        id = "gone"
        path = "gfx/gone.png"
        priority = "highest"
        kind = "texture"
        "#,
    )
    .unwrap();

    let mut resources = Resources::default();
    let mut loader = TieredLoader::spawn(manifest.assets, AssetSource::new(&dir));
    let events = drain(&mut loader, &mut resources);

    // The failure carries the asset id and error detail
    let failed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            LoaderEvent::AssetError { asset, error } => Some((asset.id.as_str(), error)),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "gone");

    // The tier and the whole load still complete
    assert!(events.iter().any(|event| matches!(
        event,
        LoaderEvent::TierComplete {
            tier: Priority::Highest,
            ..
        }
    )));
    assert!(matches!(events.last(), Some(LoaderEvent::AllComplete)));

    // The good asset stays usable, the failed one is simply absent
    assert!(resources.sprite("good").is_some());
    assert!(resources.sprite("gone").is_none());
}

#[test]
fn corrupt_file_counts_as_error_not_hang() {
    let dir = asset_dir("corrupt");
    std::fs::write(dir.join("gfx/noise.png"), [0x13, 0x37, 0x00, 0x42]).unwrap();

    let manifest = Manifest::from_str(
        r#"
        [[asset]]
        id = "noise"
        path = "gfx/noise.png"
        priority = "normal"
        kind = "texture"
        "#,
    )
    .unwrap();

    let mut resources = Resources::default();
    let mut loader = TieredLoader::spawn(manifest.assets, AssetSource::new(&dir));
    let events = drain(&mut loader, &mut resources);

    assert!(events
        .iter()
        .any(|event| matches!(event, LoaderEvent::AssetError { .. })));
    assert!(matches!(events.last(), Some(LoaderEvent::AllComplete)));
    assert!(resources.sprite("noise").is_none());
}

#[test]
fn font_loads_sheet_and_sibling_metadata() {
    let dir = asset_dir("font");
    std::fs::create_dir_all(dir.join("fonts")).unwrap();

    // 94 glyphs of 8x8 for the default '!'..='~' range
    write_png(&dir.join("fonts/mono.png"), 94 * 8, 8);
    std::fs::write(
        dir.join("fonts/mono.toml"),
        "glyph_size = { width = 8, height = 8 }\n",
    )
    .unwrap();

    let manifest = Manifest::from_str(
        r#"
        [[asset]]
        id = "banner_font"
        path = "fonts/mono.png"
        priority = "highest"
        kind = "font"
        "#,
    )
    .unwrap();

    let mut resources = Resources::default();
    let mut loader = TieredLoader::spawn(manifest.assets, AssetSource::new(&dir));
    let events = drain(&mut loader, &mut resources);

    assert!(!events
        .iter()
        .any(|event| matches!(event, LoaderEvent::AssetError { .. })));

    let font = resources.font("banner_font").unwrap();
    assert_eq!(font.measure("Moon", 1.0), 32.0);
}
