use crate::analyze::{CelScan, ScannedCel};
use crate::codec::write_indexed_png;
use crate::error::{CelpackError, Result};
use crate::model::{CelImage, Sprite};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Files written by an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub dir: PathBuf,
    /// Written files, in the order of the scan they came from.
    pub written: Vec<PathBuf>,
}

impl ExportSummary {
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

/// Checks that `sprite` exists, has been saved to a file and has no unsaved changes.
pub fn check_exportable(sprite: Option<&Sprite>) -> Result<&Sprite> {
    let sprite = sprite.ok_or(CelpackError::NoActiveSprite)?;
    if sprite.filename().is_none() {
        return Err(CelpackError::UnsavedSprite);
    }
    if sprite.is_modified() {
        return Err(CelpackError::ModifiedSprite);
    }
    Ok(sprite)
}

/// `<dir of sprite file>/<file stem>/`.
pub fn export_dir(sprite: &Sprite) -> Result<PathBuf> {
    let path = sprite.filename().ok_or(CelpackError::UnsavedSprite)?;
    let stem = path.file_stem().ok_or(CelpackError::UnsavedSprite)?;
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(stem))
}

pub fn export_file_name(frame: u32, layer_index: usize) -> String {
    format!("Frame-{}-Layer-{}.png", frame, layer_index)
}

/// Writes one cel as a single-frame indexed PNG of the cel's own size, using the sprite's
/// first palette. Returns the written path.
pub fn export_cel(sprite: &Sprite, item: &ScannedCel, dir: &Path) -> Result<PathBuf> {
    let cel = item.cel(sprite).ok_or(CelpackError::CelNotFound {
        layer: item.layer_index,
        frame: item.frame,
    })?;
    let CelImage::Indexed(indices) = &cel.image else {
        return Err(CelpackError::NotIndexed);
    };
    let path = dir.join(export_file_name(item.frame, item.layer_index));
    write_indexed_png(&path, indices, sprite.palette())?;
    debug!(?path, layer = item.layer_index, frame = item.frame, "exported cel");
    Ok(path)
}

#[instrument(skip_all)]
/// Exports every cel of `scan` into [`export_dir`]. Refuses unsaved or modified sprites
/// before touching the filesystem; the first write failure aborts the run.
pub fn export_all_cels(sprite: &Sprite, scan: &CelScan) -> Result<ExportSummary> {
    check_exportable(Some(sprite))?;
    let dir = export_dir(sprite)?;
    fs::create_dir_all(&dir)?;
    let mut summary = ExportSummary {
        dir: dir.clone(),
        written: Vec::with_capacity(scan.cels.len()),
    };
    for item in &scan.cels {
        summary.written.push(export_cel(sprite, item, &dir)?);
    }
    info!(count = summary.count(), dir = ?summary.dir, "cels exported");
    Ok(summary)
}

/// Describes an export run as JSON: `{ dir, files: [{ file, frame, layer, layerName, bank, mixed }] }`.
/// `bank` is null for mixed cels.
pub fn export_manifest(summary: &ExportSummary, scan: &CelScan) -> Value {
    let files: Vec<Value> = summary
        .written
        .iter()
        .zip(&scan.cels)
        .map(|(path, item)| {
            let file = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            json!({
                "file": file,
                "frame": item.frame,
                "layer": item.layer_index,
                "layerName": item.layer_name,
                "bank": item.banks.bank,
                "mixed": item.is_mixed(),
            })
        })
        .collect();
    json!({
        "dir": summary.dir.to_string_lossy().replace('\\', "/"),
        "count": summary.count(),
        "files": files,
    })
}
