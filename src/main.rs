use miette::Result;
use sideshow::{
    app::Sideshow,
    assets::{AssetSource, Manifest},
    Config, Game,
};

/// Open the demo window and start loading the declared assets.
fn main() -> Result<()> {
    let config = Config::default()
        .with_title("Sideshow")
        .with_buffer_size(640.0, 360.0)
        .with_scaling(2.0)
        .with_background_color(0xFF008080);

    // The asset declarations live next to the assets themselves
    let manifest = Manifest::from_path("assets/manifest.toml")?;
    let game = Sideshow::new(
        manifest.assets,
        AssetSource::new("assets"),
        config.background_color,
    );

    game.run(config)
}
