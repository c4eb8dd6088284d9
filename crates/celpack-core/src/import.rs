use crate::codec::SourceImage;
use crate::config::{CelConfig, ColorMode};
use crate::error::{CelpackError, Result};
use crate::model::{Cel, CelImage, Palette, Point, Sprite};
use crate::scan::ScanResult;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Outcome of rebuilding a sprite from scanned files.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub cels_placed: usize,
    pub frames: u32,
    pub layers: usize,
    pub color_mode: ColorMode,
    pub width: u32,
    pub height: u32,
}

impl ImportSummary {
    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Imported {} cels into {}x{} {} sprite ({} frames, {} layers)",
            self.cels_placed, self.width, self.height, self.color_mode, self.frames, self.layers
        )
    }
}

#[instrument(skip_all)]
/// Builds a new sprite from a folder scan.
///
/// Notes:
/// - The canvas is the max width/height over all files; every cel sits at (0, 0).
/// - One layer per distinct layer number (ascending), one frame per normalized frame number.
/// - In RGB mode indexed files are converted through their own palette.
/// - All edits form a single undo step on the new sprite.
pub fn create_sprite_from_files(
    scan: &ScanResult,
    cfg: &CelConfig,
) -> Result<(Sprite, ImportSummary)> {
    cfg.validate()?;
    if scan.files.is_empty() || scan.pixel_area() == 0 {
        return Err(CelpackError::EmptyCanvas);
    }

    let mode = scan.target_color_mode();
    let palette = scan
        .reference_palette
        .clone()
        .unwrap_or_else(|| Palette::new(vec![[0, 0, 0, 0]]));
    let mut sprite = Sprite::new(scan.max_width, scan.max_height, mode, palette);
    sprite.transparent_index = cfg.transparent_index;

    let placed = sprite.apply("Import frame/layer PNGs", |sprite| {
        sprite.frames = scan.frame_count();
        let mut placed = 0usize;
        for (&layer_no, group) in &scan.layers {
            let stack_index = sprite.add_layer(cfg.layer_name(layer_no));
            for &file_idx in &group.files {
                let file = &scan.files[file_idx];
                let frame = scan.normalized_frame(file.frame);
                let image = match (&file.image, mode) {
                    (SourceImage::Indexed { indices, .. }, ColorMode::Indexed) => {
                        CelImage::Indexed(indices.clone())
                    }
                    (other, _) => CelImage::Rgba(other.to_rgba()),
                };
                debug!(layer = layer_no, frame, path = ?file.path, "place cel");
                if let Some(layer) = sprite.layer_mut(stack_index) {
                    layer.insert_cel(Cel {
                        frame,
                        position: Point::default(),
                        image,
                    });
                    placed += 1;
                }
            }
        }
        Ok(placed)
    })?;

    let summary = ImportSummary {
        cels_placed: placed,
        frames: sprite.frames,
        layers: sprite.layers.len(),
        color_mode: mode,
        width: sprite.width,
        height: sprite.height,
    };
    info!(
        cels = summary.cels_placed,
        frames = summary.frames,
        layers = summary.layers,
        mode = %summary.color_mode,
        "sprite created"
    );
    Ok((sprite, summary))
}
