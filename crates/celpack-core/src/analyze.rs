use crate::bank::{CelBanks, classify_indices};
use crate::config::{CelConfig, ColorMode};
use crate::error::{CelpackError, Result};
use crate::model::{Cel, Sprite};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// A cel with at least one non-reserved pixel, addressed by layer stack index and frame.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScannedCel {
    pub layer_index: usize,
    pub layer_name: String,
    pub frame: u32,
    pub banks: CelBanks,
}

impl ScannedCel {
    pub fn is_mixed(&self) -> bool {
        self.banks.is_mixed()
    }

    /// Resolves the cel in `sprite`.
    pub fn cel<'s>(&self, sprite: &'s Sprite) -> Option<&'s Cel> {
        sprite.layer(self.layer_index)?.cel(self.frame)
    }

    pub fn label(&self) -> String {
        format!(
            "{} (L{}) frame {}",
            self.layer_name, self.layer_index, self.frame
        )
    }
}

/// Bank classification of every non-empty cel of a sprite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CelScan {
    /// Cels to export, bottom layer first, then by frame.
    pub cels: Vec<ScannedCel>,
    /// Number of cels that were skipped because every pixel is reserved.
    pub empty_cels: usize,
}

impl CelScan {
    /// Cels whose pixels span more than one bank.
    pub fn mixed(&self) -> impl Iterator<Item = &ScannedCel> {
        self.cels.iter().filter(|c| c.is_mixed())
    }

    pub fn mixed_count(&self) -> usize {
        self.mixed().count()
    }

    /// Count of single-bank cels per bank id.
    pub fn bank_counts(&self) -> BTreeMap<u16, usize> {
        let mut counts = BTreeMap::new();
        for bank in self.cels.iter().filter_map(|c| c.banks.bank) {
            *counts.entry(bank).or_insert(0) += 1;
        }
        counts
    }
}

#[instrument(skip_all)]
/// Classifies every cel of an indexed sprite by palette bank.
///
/// Layers whose name starts with the mask prefix are skipped, as are cels with no
/// non-reserved pixel.
pub fn scan_cels(sprite: &Sprite, cfg: &CelConfig) -> Result<CelScan> {
    cfg.validate()?;
    if sprite.color_mode != ColorMode::Indexed {
        return Err(CelpackError::NotIndexed);
    }
    let mut scan = CelScan::default();
    for (i, layer) in sprite.layers.iter().enumerate() {
        if cfg.is_mask_layer(&layer.name) {
            debug!(layer = %layer.name, "skip mask layer");
            continue;
        }
        for cel in &layer.cels {
            let Some(indices) = cel.image.indices() else {
                continue;
            };
            let banks = classify_indices(indices.as_raw(), cfg.bank_size);
            if !banks.has_valid_pixels {
                scan.empty_cels += 1;
                continue;
            }
            scan.cels.push(ScannedCel {
                layer_index: i + 1,
                layer_name: layer.name.clone(),
                frame: cel.frame,
                banks,
            });
        }
    }
    info!(
        cels = scan.cels.len(),
        mixed = scan.mixed_count(),
        empty = scan.empty_cels,
        "scanned cels"
    );
    Ok(scan)
}
