#![allow(dead_code)]

use celpack_core::prelude::*;
use celpack_core::{write_indexed_png, write_rgba_png};
use image::{GrayImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

pub fn palette4() -> Palette {
    Palette::new(vec![
        [0, 0, 0, 0],
        [255, 0, 0, 255],
        [0, 255, 0, 255],
        [0, 0, 255, 255],
    ])
}

/// 48-entry palette (three banks) with distinct colors per index.
pub fn banked_palette() -> Palette {
    Palette::new((0..48u8).map(|i| [i, i.wrapping_mul(3), 255 - i, 255]).collect())
}

pub fn write_indexed(dir: &Path, name: &str, w: u32, h: u32, data: Vec<u8>, palette: &Palette) -> PathBuf {
    let path = dir.join(name);
    let img = GrayImage::from_raw(w, h, data).expect("buffer matches size");
    write_indexed_png(&path, &img, palette).expect("write indexed png");
    path
}

pub fn write_rgba(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_pixel(w, h, Rgba(color));
    write_rgba_png(&path, &img).expect("write rgba png");
    path
}

/// Indexed sprite with one layer per entry of `cels` (each a single cel at frame 1).
pub fn indexed_sprite(w: u32, h: u32, cels: Vec<(&str, Point, GrayImage)>) -> Sprite {
    let mut sprite = Sprite::new(w, h, ColorMode::Indexed, banked_palette());
    for (name, position, img) in cels {
        let idx = sprite.add_layer(name);
        sprite.layer_mut(idx).expect("layer").insert_cel(Cel {
            frame: 1,
            position,
            image: CelImage::Indexed(img),
        });
    }
    sprite
}

pub fn gray(w: u32, h: u32, data: Vec<u8>) -> GrayImage {
    GrayImage::from_raw(w, h, data).expect("buffer matches size")
}
