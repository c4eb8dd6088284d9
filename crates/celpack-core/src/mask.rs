use crate::analyze::CelScan;
use crate::bank::{bank_of, mask_index};
use crate::compositing::blit_indexed;
use crate::config::{CelConfig, ColorMode};
use crate::error::{CelpackError, Result};
use crate::model::{Cel, CelImage, Point, Sprite};
use image::GrayImage;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Outcome of a masking pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MaskSummary {
    pub cels_masked: usize,
    pub layers_created: usize,
    /// Mask layers that already existed before the pass.
    pub layers_reused: usize,
    /// Existing mask cels that were replaced.
    pub cels_replaced: usize,
}

impl MaskSummary {
    pub fn summary(&self) -> String {
        format!(
            "Masked {} cels ({} mask layers created, {} reused, {} cels replaced)",
            self.cels_masked, self.layers_created, self.layers_reused, self.cels_replaced
        )
    }
}

/// Builds the full-canvas overlay for one cel: every non-reserved pixel becomes the compact
/// index of its bank at its absolute canvas position; everything else stays 0.
pub fn build_mask_image(cel: &Cel, canvas: (u32, u32), bank_size: u16) -> Option<GrayImage> {
    let indices = cel.image.indices()?;
    let mut mask = GrayImage::new(canvas.0, canvas.1);
    blit_indexed(indices, &mut mask, cel.position, |v| {
        bank_of(v, bank_size).map(|bank| mask_index(bank, bank_size))
    });
    Some(mask)
}

#[instrument(skip_all)]
/// Writes a mask cel for every mixed cel of `scan`.
///
/// Masks for a layer go to `"{prefix}-L{stack index}-{layer name}"`, created on top of the
/// stack when missing. A mask cel already at the same frame is replaced. The pass is one
/// transaction: it commits as a single undo step or leaves the sprite untouched on error.
pub fn mask_multi_pal_cels(
    sprite: &mut Sprite,
    scan: &CelScan,
    cfg: &CelConfig,
) -> Result<MaskSummary> {
    cfg.validate()?;
    if sprite.color_mode != ColorMode::Indexed {
        return Err(CelpackError::NotIndexed);
    }
    let mixed: Vec<_> = scan.mixed().cloned().collect();
    if mixed.is_empty() {
        return Ok(MaskSummary::default());
    }

    let summary = sprite.apply("Mask multi-palette cels", |sprite| {
        let mut summary = MaskSummary::default();
        let mut touched: HashSet<usize> = HashSet::new();
        let canvas = (sprite.width, sprite.height);
        for item in &mixed {
            let cel = item.cel(sprite).ok_or(CelpackError::CelNotFound {
                layer: item.layer_index,
                frame: item.frame,
            })?;
            let Some(mask) = build_mask_image(cel, canvas, cfg.bank_size) else {
                continue;
            };

            let name = cfg.mask_layer_name(item.layer_index, &item.layer_name);
            let target = match sprite.find_layer(&name) {
                Some(idx) => {
                    if touched.insert(idx) {
                        summary.layers_reused += 1;
                    }
                    idx
                }
                None => {
                    let idx = sprite.add_layer(name.clone());
                    touched.insert(idx);
                    summary.layers_created += 1;
                    idx
                }
            };
            let Some(layer) = sprite.layer_mut(target) else {
                continue;
            };
            if layer.remove_cel(item.frame).is_some() {
                summary.cels_replaced += 1;
            }
            layer.insert_cel(Cel {
                frame: item.frame,
                position: Point::default(),
                image: CelImage::Indexed(mask),
            });
            summary.cels_masked += 1;
            debug!(layer = %name, frame = item.frame, "wrote mask cel");
        }
        Ok(summary)
    })?;

    info!(
        masked = summary.cels_masked,
        created = summary.layers_created,
        reused = summary.layers_reused,
        replaced = summary.cels_replaced,
        "mask pass committed"
    );
    Ok(summary)
}
