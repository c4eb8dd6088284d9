//! Core library for rebuilding layered pixel-art sprites from PNG folders and taking them apart again.
//!
//! - Import: `scan_png_files` reads `frame-<n>-layer-<n>.png` files; `create_sprite_from_files` builds the sprite
//! - Palette banks: `scan_cels` classifies cels by 16-color bank; `mask_multi_pal_cels` writes bank overlays for mixed cels
//! - Export: `export_all_cels` writes one indexed PNG per cel next to the saved sprite document
//! - Edits run in transactions with whole-step undo/redo; sprites persist as JSON documents
//!
//! Quick example:
//! ```ignore
//! use celpack_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = CelConfig::default();
//! let scan = scan_png_files("frames/".as_ref(), &cfg)?;
//! let (mut sprite, summary) = create_sprite_from_files(&scan, &cfg)?;
//! save_sprite(&mut sprite, "hero.celpack".as_ref())?;
//! let cels = scan_cels(&sprite, &cfg)?;
//! let exported = export_all_cels(&sprite, &cels)?;
//! println!("{} / {} cels", summary.cels_placed, exported.count());
//! # Ok(()) }
//! ```

pub mod analyze;
pub mod bank;
pub mod codec;
pub mod compositing;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod mask;
pub mod model;
pub mod render;
pub mod scan;
pub mod transaction;
pub mod view;

pub use analyze::*;
pub use bank::*;
pub use codec::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use export::*;
pub use import::*;
pub use mask::*;
pub use model::*;
pub use render::*;
pub use scan::*;
pub use view::*;

/// Convenience prelude for common types and functions.
/// Importing `celpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::analyze::{CelScan, ScannedCel, scan_cels};
    pub use crate::bank::{CelBanks, bank_of, classify_indices, is_reserved, mask_index};
    pub use crate::config::{CelConfig, CelConfigBuilder, ColorMode};
    pub use crate::document::{load_sprite, save_sprite};
    pub use crate::export::{
        ExportSummary, check_exportable, export_all_cels, export_cel, export_dir, export_manifest,
    };
    pub use crate::import::{ImportSummary, create_sprite_from_files};
    pub use crate::mask::{MaskSummary, mask_multi_pal_cels};
    pub use crate::model::{Cel, CelImage, Layer, Palette, Point, Sprite};
    pub use crate::render::render_frame;
    pub use crate::scan::{ScanResult, SourceFile, parse_file_name, scan_png_files};
    pub use crate::transaction::Transaction;
    pub use crate::view::{ExportView, ImportView};
}
