//! Presentation state for the import and export screens.
//!
//! Views are plain data recomputed from scan results; front ends only render them.

use crate::analyze::CelScan;
use crate::config::{CelConfig, ColorMode};
use crate::error::CelpackError;
use crate::export::check_exportable;
use crate::model::Sprite;
use crate::scan::ScanResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The first `limit` entries of a list plus how many were left out.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DiagnosticList {
    pub shown: Vec<String>,
    pub overflow: usize,
}

impl DiagnosticList {
    pub fn capped<I, S>(items: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for item in items {
            if list.shown.len() < limit {
                list.shown.push(item.into());
            } else {
                list.overflow += 1;
            }
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.overflow == 0
    }

    pub fn total(&self) -> usize {
        self.shown.len() + self.overflow
    }

    fn push_lines(&self, title: &str, out: &mut Vec<String>) {
        if self.is_empty() {
            return;
        }
        out.push(format!("{} ({}):", title, self.total()));
        out.extend(self.shown.iter().map(|s| format!("  - {s}")));
        if self.overflow > 0 {
            out.push(format!("  ... and {} more", self.overflow));
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportView {
    pub folder: String,
    pub file_count: usize,
    pub layer_count: usize,
    /// Normalized frame range `(first, last)`.
    pub frames: Option<(u32, u32)>,
    pub canvas: (u32, u32),
    pub color_mode: Option<ColorMode>,
    pub mismatched_palettes: DiagnosticList,
    pub non_indexed: DiagnosticList,
    pub unreadable: DiagnosticList,
    pub duplicates: DiagnosticList,
    /// Reason the import cannot proceed.
    pub blocking: Option<String>,
    pub can_import: bool,
}

impl ImportView {
    /// Both palette diagnostics are reported when both conditions occur.
    pub fn from_scan(folder: &Path, scan: &ScanResult, cfg: &CelConfig) -> Self {
        let limit = cfg.diagnostic_limit;
        let blocking = if scan.files.is_empty() || scan.pixel_area() == 0 {
            Some(CelpackError::EmptyCanvas.to_string())
        } else {
            None
        };
        let frames = (!scan.files.is_empty()).then(|| {
            (
                scan.normalized_frame(scan.min_frame),
                scan.normalized_frame(scan.max_frame),
            )
        });
        Self {
            folder: folder.display().to_string(),
            file_count: scan.files.len(),
            layer_count: scan.layers.len(),
            frames,
            canvas: (scan.max_width, scan.max_height),
            color_mode: (!scan.files.is_empty()).then(|| scan.target_color_mode()),
            mismatched_palettes: DiagnosticList::capped(
                scan.mismatched_palettes.iter().map(|p| file_label(p)),
                limit,
            ),
            non_indexed: DiagnosticList::capped(
                scan.non_indexed.iter().map(|p| file_label(p)),
                limit,
            ),
            unreadable: DiagnosticList::capped(
                scan.unreadable
                    .iter()
                    .map(|s| format!("{}: {}", file_label(&s.path), s.reason)),
                limit,
            ),
            duplicates: DiagnosticList::capped(
                scan.duplicates.iter().map(|p| file_label(p)),
                limit,
            ),
            can_import: blocking.is_none(),
            blocking,
        }
    }

    /// View for a folder that could not be scanned at all.
    pub fn from_error(folder: &Path, err: &CelpackError) -> Self {
        Self {
            folder: folder.display().to_string(),
            file_count: 0,
            layer_count: 0,
            frames: None,
            canvas: (0, 0),
            color_mode: None,
            mismatched_palettes: DiagnosticList::default(),
            non_indexed: DiagnosticList::default(),
            unreadable: DiagnosticList::default(),
            duplicates: DiagnosticList::default(),
            blocking: Some(err.to_string()),
            can_import: false,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![format!("Folder: {}", self.folder)];
        if let Some(reason) = &self.blocking {
            out.push(format!("Cannot import: {reason}"));
            return out;
        }
        out.push(format!(
            "Files: {} | Layers: {} | Canvas: {}x{}",
            self.file_count, self.layer_count, self.canvas.0, self.canvas.1
        ));
        if let Some((first, last)) = self.frames {
            out.push(format!("Frames: {first}..={last}"));
        }
        if let Some(mode) = self.color_mode {
            out.push(format!("Color mode: {mode}"));
        }
        self.mismatched_palettes
            .push_lines("Files with a different palette (imported as RGB)", &mut out);
        self.non_indexed
            .push_lines("Non-indexed files (imported as RGB)", &mut out);
        self.unreadable.push_lines("Unreadable files (skipped)", &mut out);
        self.duplicates
            .push_lines("Duplicate frame/layer files (skipped)", &mut out);
        out
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportView {
    pub sprite_name: String,
    pub layers: usize,
    pub frames: u32,
    pub exportable_cels: usize,
    pub empty_cels: usize,
    /// Single-bank cels per bank id.
    pub bank_counts: BTreeMap<u16, usize>,
    pub mixed: DiagnosticList,
    pub blocking: Option<String>,
    pub can_export: bool,
    pub can_mask: bool,
}

impl ExportView {
    pub fn from_scan(
        sprite: &Sprite,
        scan: Result<&CelScan, &CelpackError>,
        cfg: &CelConfig,
    ) -> Self {
        let sprite_name = sprite
            .filename()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(unsaved)".into());
        let blocking = match (check_exportable(Some(sprite)), scan) {
            (Err(e), _) => Some(e.to_string()),
            (Ok(_), Err(e)) => Some(e.to_string()),
            (Ok(_), Ok(_)) => None,
        };
        let (exportable_cels, empty_cels, bank_counts, mixed) = match scan {
            Ok(scan) => (
                scan.cels.len(),
                scan.empty_cels,
                scan.bank_counts(),
                DiagnosticList::capped(scan.mixed().map(|c| c.label()), cfg.diagnostic_limit),
            ),
            Err(_) => (0, 0, BTreeMap::new(), DiagnosticList::default()),
        };
        Self {
            sprite_name,
            layers: sprite.layers.len(),
            frames: sprite.frames,
            can_export: blocking.is_none() && exportable_cels > 0,
            can_mask: blocking.is_none() && !mixed.is_empty(),
            exportable_cels,
            empty_cels,
            bank_counts,
            mixed,
            blocking,
        }
    }

    /// View shown when no sprite is open.
    pub fn no_sprite() -> Self {
        Self {
            sprite_name: String::new(),
            layers: 0,
            frames: 0,
            exportable_cels: 0,
            empty_cels: 0,
            bank_counts: BTreeMap::new(),
            mixed: DiagnosticList::default(),
            blocking: Some(CelpackError::NoActiveSprite.to_string()),
            can_export: false,
            can_mask: false,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.sprite_name.is_empty() {
            out.push(format!(
                "Sprite: {} ({} layers, {} frames)",
                self.sprite_name, self.layers, self.frames
            ));
        }
        if let Some(reason) = &self.blocking {
            out.push(format!("Cannot export: {reason}"));
            return out;
        }
        out.push(format!(
            "Cels to export: {} (skipped empty: {})",
            self.exportable_cels, self.empty_cels
        ));
        for (bank, count) in &self.bank_counts {
            out.push(format!("  bank {bank}: {count} cels"));
        }
        self.mixed
            .push_lines("Cels mixing palette banks", &mut out);
        out
    }
}
