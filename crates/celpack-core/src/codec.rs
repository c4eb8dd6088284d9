use crate::config::ColorMode;
use crate::error::{CelpackError, Result};
use crate::model::Palette;
use image::{GrayImage, ImageReader, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Decoded PNG content: palette indices with their palette, or RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceImage {
    Indexed { indices: GrayImage, palette: Palette },
    Rgba(RgbaImage),
}

impl SourceImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Indexed { indices, .. } => indices.dimensions(),
            Self::Rgba(img) => img.dimensions(),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        match self {
            Self::Indexed { .. } => ColorMode::Indexed,
            Self::Rgba(_) => ColorMode::Rgb,
        }
    }

    pub fn palette(&self) -> Option<&Palette> {
        match self {
            Self::Indexed { palette, .. } => Some(palette),
            Self::Rgba(_) => None,
        }
    }

    /// RGBA pixels; indexed images resolve through their own palette.
    pub fn to_rgba(&self) -> RgbaImage {
        match self {
            Self::Indexed { indices, palette } => palette.to_rgba(indices),
            Self::Rgba(img) => img.clone(),
        }
    }
}

/// Reads a PNG file. Indexed PNGs keep one index per pixel (bit depths below 8 are unpacked)
/// and their `PLTE`/`tRNS` palette; every other color type is decoded to RGBA8.
pub fn read_png(path: &Path) -> Result<SourceImage> {
    let mut decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;
    if reader.info().color_type != png::ColorType::Indexed {
        drop(reader);
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        return Ok(SourceImage::Rgba(img.to_rgba8()));
    }

    let palette = {
        let info = reader.info();
        let plte = info
            .palette
            .as_deref()
            .ok_or_else(|| CelpackError::UnsupportedPng("indexed PNG without PLTE".into()))?;
        Palette::from_png_chunks(plte, info.trns.as_deref())
    };
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let indices = unpack_indices(
        &buf[..frame.buffer_size()],
        frame.width,
        frame.height,
        frame.line_size,
        frame.bit_depth as u8,
    )?;
    Ok(SourceImage::Indexed { indices, palette })
}

fn unpack_indices(
    data: &[u8],
    width: u32,
    height: u32,
    line_size: usize,
    bits: u8,
) -> Result<GrayImage> {
    if !matches!(bits, 1 | 2 | 4 | 8) {
        return Err(CelpackError::UnsupportedPng(format!(
            "indexed bit depth {bits}"
        )));
    }
    let per_byte = 8 / bits as u32;
    let mask = ((1u16 << bits) - 1) as u8;
    let mut out = Vec::with_capacity((width * height) as usize);
    for row in data.chunks(line_size).take(height as usize) {
        for x in 0..width {
            let byte = row[(x / per_byte) as usize];
            let shift = 8 - bits as u32 * (x % per_byte + 1);
            out.push((byte >> shift) & mask);
        }
    }
    GrayImage::from_raw(width, height, out)
        .ok_or_else(|| CelpackError::UnsupportedPng("truncated image data".into()))
}

/// Writes an 8-bit indexed PNG. The palette is padded with transparent black so that every
/// index used by `indices` has an entry.
pub fn write_indexed_png(path: &Path, indices: &GrayImage, palette: &Palette) -> Result<()> {
    let used = indices.as_raw().iter().copied().max().map_or(1, |m| m as usize + 1);
    let mut palette = palette.clone();
    palette.colors.truncate(256);
    if palette.len() < used {
        palette.colors.resize(used, [0, 0, 0, 0]);
    }
    let (plte, trns) = palette.to_png_chunks();

    let (w, h) = indices.dimensions();
    let mut encoder = png::Encoder::new(BufWriter::new(File::create(path)?), w, h);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte);
    if !trns.is_empty() {
        encoder.set_trns(trns);
    }
    let mut writer = encoder.write_header()?;
    writer.write_image_data(indices.as_raw())?;
    writer.finish()?;
    Ok(())
}

pub fn write_rgba_png(path: &Path, rgba: &RgbaImage) -> Result<()> {
    rgba.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
