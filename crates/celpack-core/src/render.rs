use crate::compositing::blend_rgba;
use crate::config::CelConfig;
use crate::model::{CelImage, Sprite};
use image::RgbaImage;

/// Flattens one frame to RGBA.
///
/// Visible layers are drawn bottom to top; mask layers are skipped. Indexed cels resolve
/// through the first palette and pixels equal to the transparent index are not drawn.
pub fn render_frame(sprite: &Sprite, frame: u32, cfg: &CelConfig) -> RgbaImage {
    let mut canvas = RgbaImage::new(sprite.width, sprite.height);
    for layer in &sprite.layers {
        if !layer.visible || cfg.is_mask_layer(&layer.name) {
            continue;
        }
        let Some(cel) = layer.cel(frame) else {
            continue;
        };
        match &cel.image {
            CelImage::Rgba(img) => blend_rgba(img, &mut canvas, cel.position),
            CelImage::Indexed(indices) => {
                let palette = sprite.palette();
                let (w, h) = indices.dimensions();
                let rgba = RgbaImage::from_fn(w, h, |x, y| {
                    let idx = indices.get_pixel(x, y)[0];
                    if idx == sprite.transparent_index {
                        image::Rgba([0, 0, 0, 0])
                    } else {
                        image::Rgba(palette.get(idx).unwrap_or([0, 0, 0, 0]))
                    }
                });
                blend_rgba(&rgba, &mut canvas, cel.position);
            }
        }
    }
    canvas
}
