//! Sprite loading
//!
//! Collision masks come from PNG sprite art when an asset directory is
//! configured, and from procedural shapes otherwise.

use std::path::Path;

use anyhow::{Context, Result};
use flapper_core::{CollisionMask, SpriteConfig, SpriteSet};
use image::RgbaImage;
use image::imageops::FilterType;

use crate::config::AssetConfig;

/// Agent animation frames, in playback order
pub const AGENT_FRAMES: [&str; 3] = ["bird1.png", "bird2.png", "bird3.png"];
/// Bottom barrier; the top barrier is its mirror image
pub const BARRIER: &str = "pipe.png";
/// Ground tile, only its width matters
pub const GROUND: &str = "base.png";

/// Decoded PNG image (raw RGBA bytes)
#[derive(Debug, Clone)]
pub struct SpriteAsset {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl SpriteAsset {
    /// Decode a PNG file and upscale it by an integer factor
    pub fn load(path: &Path, scale: u32) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let img = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgba8();
        let img = upscale(img, scale);
        Ok(Self {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
        })
    }

    pub fn mask(&self) -> Result<CollisionMask> {
        Ok(CollisionMask::from_rgba(self.width, self.height, &self.data)?)
    }
}

fn upscale(img: RgbaImage, scale: u32) -> RgbaImage {
    if scale <= 1 {
        return img;
    }
    let (w, h) = (img.width() * scale, img.height() * scale);
    image::imageops::resize(&img, w, h, FilterType::Nearest)
}

/// Build the sprite set for a run
pub fn load_sprites(assets: &AssetConfig, sprites: &SpriteConfig) -> Result<SpriteSet> {
    let Some(dir) = &assets.dir else {
        log::debug!("No asset directory configured, using procedural sprites");
        return Ok(SpriteSet::procedural(sprites));
    };

    log::info!("Loading sprites from: {}", dir.display());

    let frames = AGENT_FRAMES
        .iter()
        .map(|name| SpriteAsset::load(&dir.join(name), assets.scale)?.mask())
        .collect::<Result<Vec<_>>>()?;
    let barrier = SpriteAsset::load(&dir.join(BARRIER), assets.scale)?.mask()?;

    let mut config = sprites.clone();
    let ground_path = dir.join(GROUND);
    if ground_path.exists() {
        config.ground_width = SpriteAsset::load(&ground_path, assets.scale)?.width;
    } else {
        log::warn!(
            "{} not found, ground tiles keep width {}",
            ground_path.display(),
            config.ground_width
        );
    }

    Ok(SpriteSet::procedural(&config)
        .with_agent_frames(frames)?
        .with_barrier(barrier))
}
