use crate::config::ColorMode;
use crate::transaction::History;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// RGBA color as stored in a palette entry.
pub type Color = [u8; 4];

/// Ordered list of RGBA colors addressed by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Builds a palette from PNG `PLTE` (packed RGB) and optional `tRNS` (alpha per entry).
    /// Entries without a `tRNS` value are opaque.
    pub fn from_png_chunks(plte: &[u8], trns: Option<&[u8]>) -> Self {
        let colors = plte
            .chunks_exact(3)
            .enumerate()
            .map(|(i, rgb)| {
                let a = trns.and_then(|t| t.get(i).copied()).unwrap_or(255);
                [rgb[0], rgb[1], rgb[2], a]
            })
            .collect();
        Self { colors }
    }

    /// Splits the palette into PNG `PLTE` and `tRNS` payloads (at most 256 entries).
    /// Trailing opaque entries are dropped from `tRNS`.
    pub fn to_png_chunks(&self) -> (Vec<u8>, Vec<u8>) {
        let entries = &self.colors[..self.colors.len().min(256)];
        let plte = entries.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
        let mut trns: Vec<u8> = entries.iter().map(|c| c[3]).collect();
        while trns.last() == Some(&255) {
            trns.pop();
        }
        (plte, trns)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, or `None` past the end of the palette.
    pub fn get(&self, index: u8) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }

    /// Converts an index buffer to RGBA by direct lookup; out-of-range indices become transparent.
    pub fn to_rgba(&self, indices: &GrayImage) -> RgbaImage {
        let (w, h) = indices.dimensions();
        RgbaImage::from_fn(w, h, |x, y| {
            let idx = indices.get_pixel(x, y)[0];
            image::Rgba(self.get(idx).unwrap_or([0, 0, 0, 0]))
        })
    }
}

/// Pixel content of a cel.
#[derive(Debug, Clone, PartialEq)]
pub enum CelImage {
    Indexed(GrayImage),
    Rgba(RgbaImage),
}

impl CelImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Indexed(img) => img.dimensions(),
            Self::Rgba(img) => img.dimensions(),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        match self {
            Self::Indexed(_) => ColorMode::Indexed,
            Self::Rgba(_) => ColorMode::Rgb,
        }
    }

    /// Palette indices for indexed images.
    pub fn indices(&self) -> Option<&GrayImage> {
        match self {
            Self::Indexed(img) => Some(img),
            Self::Rgba(_) => None,
        }
    }
}

/// Signed canvas position of a cel's top-left pixel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Image placed on one layer at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Cel {
    pub frame: u32,
    pub position: Point,
    pub image: CelImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    /// Cels ordered by frame, at most one per frame.
    pub cels: Vec<Cel>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            cels: Vec::new(),
        }
    }

    pub fn cel(&self, frame: u32) -> Option<&Cel> {
        self.cels
            .binary_search_by_key(&frame, |c| c.frame)
            .ok()
            .map(|i| &self.cels[i])
    }

    /// Inserts `cel`, keeping frame order. Returns the cel it replaced, if any.
    pub fn insert_cel(&mut self, cel: Cel) -> Option<Cel> {
        match self.cels.binary_search_by_key(&cel.frame, |c| c.frame) {
            Ok(i) => Some(std::mem::replace(&mut self.cels[i], cel)),
            Err(i) => {
                self.cels.insert(i, cel);
                None
            }
        }
    }

    pub fn remove_cel(&mut self, frame: u32) -> Option<Cel> {
        self.cels
            .binary_search_by_key(&frame, |c| c.frame)
            .ok()
            .map(|i| self.cels.remove(i))
    }
}

/// A layered, multi-frame sprite.
///
/// Layers are ordered bottom to top; a layer's stack index is its 1-based position.
/// Frames are numbered `1..=frames`.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    pub transparent_index: u8,
    /// Never empty; the first palette is the one used for export and rendering.
    pub palettes: Vec<Palette>,
    pub layers: Vec<Layer>,
    pub frames: u32,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) modified: bool,
    pub(crate) history: History,
}

impl Sprite {
    /// Creates an empty, unsaved sprite with one frame and the given palette.
    pub fn new(width: u32, height: u32, color_mode: ColorMode, palette: Palette) -> Self {
        Self {
            width,
            height,
            color_mode,
            transparent_index: 0,
            palettes: vec![palette],
            layers: Vec::new(),
            frames: 1,
            filename: None,
            modified: false,
            history: History::default(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palettes[0]
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Layer at a 1-based stack index.
    pub fn layer(&self, stack_index: usize) -> Option<&Layer> {
        stack_index
            .checked_sub(1)
            .and_then(|i| self.layers.get(i))
    }

    pub fn layer_mut(&mut self, stack_index: usize) -> Option<&mut Layer> {
        stack_index
            .checked_sub(1)
            .and_then(move |i| self.layers.get_mut(i))
    }

    /// Stack index of the first layer named `name`.
    pub fn find_layer(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name).map(|i| i + 1)
    }

    /// Appends a layer on top of the stack and returns its stack index.
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.layers.push(Layer::new(name));
        self.layers.len()
    }

    pub fn cel_count(&self) -> usize {
        self.layers.iter().map(|l| l.cels.len()).sum()
    }
}
