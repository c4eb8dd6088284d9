use crate::model::Point;
use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Canvas-space rectangle `(x0, y0, x1, y1)` (exclusive end) covered by an image of size
/// `w x h` placed at `at`, clipped to a `cw x ch` canvas. Returns `None` when nothing overlaps.
fn clip(at: Point, w: u32, h: u32, cw: u32, ch: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = (at.x as i64).max(0);
    let y0 = (at.y as i64).max(0);
    let x1 = (at.x as i64 + w as i64).min(cw as i64);
    let y1 = (at.y as i64 + h as i64).min(ch as i64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Copies `src` placed at `at` into `canvas`, passing each source index through `map`.
/// Pixels for which `map` returns `None` leave the canvas untouched; pixels outside the
/// canvas are dropped.
pub fn blit_indexed(
    src: &GrayImage,
    canvas: &mut GrayImage,
    at: Point,
    map: impl Fn(u8) -> Option<u8>,
) {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    let Some((x0, y0, x1, y1)) = clip(at, sw, sh, cw, ch) else {
        return;
    };
    for cy in y0..y1 {
        for cx in x0..x1 {
            let sx = (cx as i64 - at.x as i64) as u32;
            let sy = (cy as i64 - at.y as i64) as u32;
            if let Some(v) = map(src.get_pixel(sx, sy)[0]) {
                canvas.put_pixel(cx, cy, Luma([v]));
            }
        }
    }
}

/// Alpha-composites `src` placed at `at` over `canvas` (straight alpha, source-over).
pub fn blend_rgba(src: &RgbaImage, canvas: &mut RgbaImage, at: Point) {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    let Some((x0, y0, x1, y1)) = clip(at, sw, sh, cw, ch) else {
        return;
    };
    for cy in y0..y1 {
        for cx in x0..x1 {
            let sx = (cx as i64 - at.x as i64) as u32;
            let sy = (cy as i64 - at.y as i64) as u32;
            let s = *src.get_pixel(sx, sy);
            if s[3] == 0 {
                continue;
            }
            let d = *canvas.get_pixel(cx, cy);
            canvas.put_pixel(cx, cy, over(s, d));
        }
    }
}

fn over(s: Rgba<u8>, d: Rgba<u8>) -> Rgba<u8> {
    if s[3] == 255 || d[3] == 0 {
        return s;
    }
    let sa = s[3] as u32;
    let da = d[3] as u32 * (255 - sa) / 255;
    let oa = sa + da;
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = ((s[c] as u32 * sa + d[c] as u32 * da) / oa) as u8;
    }
    out[3] = oa as u8;
    Rgba(out)
}
