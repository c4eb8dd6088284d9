use crate::codec::{SourceImage, read_png};
use crate::config::{CelConfig, ColorMode};
use crate::error::{CelpackError, Result};
use crate::model::Palette;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^frame-([0-9]+)-layer-([0-9]+)\.png$").expect("file name pattern is valid")
});

/// Parses `frame-<n>-layer-<n>.png` (any case) into `(frame, layer)`.
/// Returns `None` for other names and for numbers that do not fit in `u32`.
pub fn parse_file_name(name: &str) -> Option<(u32, u32)> {
    let caps = FILE_NAME_RE.captures(name)?;
    let frame = caps[1].parse().ok()?;
    let layer = caps[2].parse().ok()?;
    Some((frame, layer))
}

/// One decoded input file and the coordinate parsed from its name.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Frame number as written in the file name.
    pub frame: u32,
    pub layer: u32,
    pub width: u32,
    pub height: u32,
    pub image: SourceImage,
}

impl SourceFile {
    pub fn color_mode(&self) -> ColorMode {
        self.image.color_mode()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Files sharing a layer number, ordered by frame (indices into `ScanResult::files`).
#[derive(Debug, Clone, Default)]
pub struct LayerGroup {
    pub layer: u32,
    pub files: Vec<usize>,
}

/// Input that could not be used, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregate view over every decoded input file of a folder.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Decoded files in scan (file name) order.
    pub files: Vec<SourceFile>,
    /// Groups keyed by layer number, ascending.
    pub layers: BTreeMap<u32, LayerGroup>,
    pub min_frame: u32,
    pub max_frame: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub all_indexed: bool,
    /// True when every indexed file's palette equals the reference palette.
    pub palettes_match: bool,
    /// Palette of the first indexed file.
    pub reference_palette: Option<Palette>,
    /// Indexed files whose palette differs from the reference.
    pub mismatched_palettes: Vec<PathBuf>,
    pub non_indexed: Vec<PathBuf>,
    pub unreadable: Vec<SkippedFile>,
    /// Files ignored because an earlier file had the same (frame, layer).
    pub duplicates: Vec<PathBuf>,
}

impl ScanResult {
    /// Color mode the reconstructed sprite will use.
    pub fn target_color_mode(&self) -> ColorMode {
        if self.all_indexed && self.palettes_match && !self.files.is_empty() {
            ColorMode::Indexed
        } else {
            ColorMode::Rgb
        }
    }

    /// Offset added to every parsed frame number so that numbering starts at 1 or later.
    pub fn frame_offset(&self) -> u32 {
        u32::from(self.min_frame == 0)
    }

    pub fn normalized_frame(&self, frame: u32) -> u32 {
        frame.saturating_add(self.frame_offset())
    }

    /// Number of frames the sprite will have (`1..=frame_count`).
    pub fn frame_count(&self) -> u32 {
        if self.files.is_empty() {
            0
        } else {
            self.normalized_frame(self.max_frame)
        }
    }

    pub fn pixel_area(&self) -> u64 {
        self.max_width as u64 * self.max_height as u64
    }

    fn push(&mut self, file: SourceFile) {
        if self.files.is_empty() {
            self.min_frame = file.frame;
            self.max_frame = file.frame;
        } else {
            self.min_frame = self.min_frame.min(file.frame);
            self.max_frame = self.max_frame.max(file.frame);
        }
        self.max_width = self.max_width.max(file.width);
        self.max_height = self.max_height.max(file.height);

        match file.image.palette() {
            Some(palette) => match self.reference_palette.as_ref().map(|r| r != palette) {
                None => self.reference_palette = Some(palette.clone()),
                Some(true) => {
                    debug!(path = ?file.path, "palette differs from reference");
                    self.palettes_match = false;
                    self.mismatched_palettes.push(file.path.clone());
                }
                Some(false) => {}
            },
            None => {
                self.all_indexed = false;
                self.non_indexed.push(file.path.clone());
            }
        }

        let idx = self.files.len();
        let group = self.layers.entry(file.layer).or_insert_with(|| LayerGroup {
            layer: file.layer,
            files: Vec::new(),
        });
        group.files.push(idx);
        self.files.push(file);
    }

    fn finish(&mut self) {
        let files = &self.files;
        for group in self.layers.values_mut() {
            group.files.sort_by_key(|&i| files[i].frame);
        }
    }
}

/// Scans `dir` (non-recursively) for `frame-<n>-layer-<n>.png` files and decodes them.
///
/// Non-matching names are skipped silently; undecodable files are logged and recorded in
/// `unreadable` without aborting the scan.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan_png_files(dir: &Path, cfg: &CelConfig) -> Result<ScanResult> {
    cfg.validate()?;
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => CelpackError::Io(io),
            None => CelpackError::InvalidConfig("filesystem loop while scanning".into()),
        })?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    let result = scan_png_paths(&paths)?;
    if result.files.is_empty() && result.unreadable.is_empty() && result.duplicates.is_empty() {
        return Err(CelpackError::NoMatchingFiles {
            dir: dir.to_path_buf(),
        });
    }
    Ok(result)
}

/// Scans an explicit list of paths, in the given order.
pub fn scan_png_paths(paths: &[PathBuf]) -> Result<ScanResult> {
    let mut result = ScanResult {
        all_indexed: true,
        palettes_match: true,
        ..Default::default()
    };
    let mut seen: HashSet<(u32, u32)> = HashSet::new();

    for path in paths {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some((frame, layer)) = parse_file_name(name) else {
            continue;
        };
        if !seen.insert((frame, layer)) {
            warn!(?path, frame, layer, "duplicate frame/layer, ignoring");
            result.duplicates.push(path.clone());
            continue;
        }
        match read_png(path) {
            Ok(image) => {
                let (width, height) = image.dimensions();
                debug!(?path, frame, layer, width, height, mode = %image.color_mode(), "decoded");
                result.push(SourceFile {
                    path: path.clone(),
                    frame,
                    layer,
                    width,
                    height,
                    image,
                });
            }
            Err(e) => {
                warn!(?path, error = %e, "skip image");
                // the coordinate stays claimed by the unreadable file
                result.unreadable.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    result.finish();

    info!(
        files = result.files.len(),
        layers = result.layers.len(),
        frames = result.frame_count(),
        width = result.max_width,
        height = result.max_height,
        mode = %result.target_color_mode(),
        "scanned input files"
    );
    Ok(result)
}
