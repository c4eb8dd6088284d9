//! JSON sprite documents (`.celpack`).
//!
//! Cel pixels are stored raw: one byte per pixel for indexed sprites, four for RGB.

use crate::config::ColorMode;
use crate::error::{CelpackError, Result};
use crate::model::{Cel, CelImage, Layer, Palette, Point, Sprite};
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

pub const DOCUMENT_FORMAT: &str = "celpack-sprite";
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SpriteDocument {
    format: String,
    version: u32,
    width: u32,
    height: u32,
    color_mode: ColorMode,
    #[serde(default)]
    transparent_index: u8,
    frames: u32,
    palettes: Vec<Palette>,
    layers: Vec<LayerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerRecord {
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    cels: Vec<CelRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CelRecord {
    frame: u32,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn default_visible() -> bool {
    true
}

impl SpriteDocument {
    fn from_sprite(sprite: &Sprite) -> Self {
        let layers = sprite
            .layers
            .iter()
            .map(|layer| LayerRecord {
                name: layer.name.clone(),
                visible: layer.visible,
                cels: layer
                    .cels
                    .iter()
                    .map(|cel| {
                        let (width, height) = cel.image.dimensions();
                        let data = match &cel.image {
                            CelImage::Indexed(img) => img.as_raw().clone(),
                            CelImage::Rgba(img) => img.as_raw().clone(),
                        };
                        CelRecord {
                            frame: cel.frame,
                            x: cel.position.x,
                            y: cel.position.y,
                            width,
                            height,
                            data,
                        }
                    })
                    .collect(),
            })
            .collect();
        Self {
            format: DOCUMENT_FORMAT.into(),
            version: DOCUMENT_VERSION,
            width: sprite.width,
            height: sprite.height,
            color_mode: sprite.color_mode,
            transparent_index: sprite.transparent_index,
            frames: sprite.frames,
            palettes: sprite.palettes.clone(),
            layers,
        }
    }

    fn into_sprite(self) -> Result<Sprite> {
        if self.format != DOCUMENT_FORMAT {
            return Err(CelpackError::InvalidDocument(format!(
                "unknown format {:?}",
                self.format
            )));
        }
        if self.version > DOCUMENT_VERSION {
            return Err(CelpackError::InvalidDocument(format!(
                "version {} is newer than supported version {}",
                self.version, DOCUMENT_VERSION
            )));
        }
        let mut palettes = self.palettes.into_iter();
        let first = palettes
            .next()
            .ok_or_else(|| CelpackError::InvalidDocument("document has no palette".into()))?;
        let mut sprite = Sprite::new(self.width, self.height, self.color_mode, first);
        sprite.palettes.extend(palettes);
        sprite.transparent_index = self.transparent_index;
        sprite.frames = self.frames;

        for record in self.layers {
            let mut layer = Layer::new(record.name);
            layer.visible = record.visible;
            for cel in record.cels {
                if cel.frame == 0 || cel.frame > self.frames {
                    return Err(CelpackError::InvalidDocument(format!(
                        "layer {:?}: cel frame {} outside 1..={}",
                        layer.name, cel.frame, self.frames
                    )));
                }
                let image = decode_cel(self.color_mode, cel.width, cel.height, cel.data)
                    .ok_or_else(|| {
                        CelpackError::InvalidDocument(format!(
                            "layer {:?}: cel at frame {} has a pixel buffer that does not match {}x{}",
                            layer.name, cel.frame, cel.width, cel.height
                        ))
                    })?;
                if layer
                    .insert_cel(Cel {
                        frame: cel.frame,
                        position: Point::new(cel.x, cel.y),
                        image,
                    })
                    .is_some()
                {
                    return Err(CelpackError::InvalidDocument(format!(
                        "layer {:?}: two cels at frame {}",
                        layer.name, cel.frame
                    )));
                }
            }
            sprite.layers.push(layer);
        }
        Ok(sprite)
    }
}

fn decode_cel(mode: ColorMode, width: u32, height: u32, data: Vec<u8>) -> Option<CelImage> {
    match mode {
        ColorMode::Indexed => GrayImage::from_raw(width, height, data)
            .filter(|img| img.as_raw().len() == (width as usize) * (height as usize))
            .map(CelImage::Indexed),
        ColorMode::Rgb => RgbaImage::from_raw(width, height, data)
            .filter(|img| img.as_raw().len() == (width as usize) * (height as usize) * 4)
            .map(CelImage::Rgba),
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
/// Writes `sprite` to `path`, then records `path` as its file name and clears the modified flag.
pub fn save_sprite(sprite: &mut Sprite, path: &Path) -> Result<()> {
    let doc = SpriteDocument::from_sprite(sprite);
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, &doc)?;
    w.flush()?;
    sprite.filename = Some(path.to_path_buf());
    sprite.modified = false;
    info!(layers = sprite.layers.len(), cels = sprite.cel_count(), "sprite saved");
    Ok(())
}

#[instrument(skip_all, fields(path = %path.display()))]
/// Reads a sprite document. The result is unmodified, named after `path`, with empty history.
pub fn load_sprite(path: &Path) -> Result<Sprite> {
    let doc: SpriteDocument = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let mut sprite = doc.into_sprite()?;
    sprite.filename = Some(path.to_path_buf());
    info!(
        width = sprite.width,
        height = sprite.height,
        layers = sprite.layers.len(),
        frames = sprite.frames,
        "sprite loaded"
    );
    Ok(sprite)
}
