mod common;

use celpack_core::error::CelpackError;
use celpack_core::prelude::*;
use celpack_core::scan_png_paths;
use common::{palette4, write_indexed, write_rgba};
use image::Rgba;

#[test]
fn two_indexed_files_build_an_indexed_sprite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pal = palette4();
    write_indexed(dir.path(), "Frame-0-Layer-0.png", 4, 4, vec![1; 16], &pal);
    write_indexed(dir.path(), "Frame-1-Layer-1.png", 4, 4, vec![2; 16], &pal);
    let cfg = CelConfig::default();

    let scan = scan_png_files(dir.path(), &cfg).expect("scan");
    let (sprite, summary) = create_sprite_from_files(&scan, &cfg).expect("import");

    assert_eq!(summary.cels_placed, 2);
    assert_eq!(sprite.frames, 2);
    assert_eq!(sprite.color_mode, ColorMode::Indexed);
    assert_eq!(sprite.palette(), &pal);
    let names: Vec<&str> = sprite.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Layer 0", "Layer 1"]);

    // frame 0 on disk becomes frame 1
    let cel = sprite.layers[0].cel(1).expect("cel at frame 1");
    assert_eq!(cel.position, Point::new(0, 0));
    assert_eq!(cel.image.indices().expect("indexed").get_pixel(0, 0)[0], 1);
    assert!(sprite.layers[0].cel(2).is_none());
    assert!(sprite.layers[1].cel(2).is_some());
    assert_eq!(sprite.cel_count(), 2);
}

#[test]
fn rgb_file_converts_indexed_files_through_their_own_palette() {
    let dir = tempfile::tempdir().expect("tempdir");
    // a palette that differs from palette4 at index 1
    let own = Palette::new(vec![[0, 0, 0, 0], [10, 20, 30, 255]]);
    write_indexed(dir.path(), "frame-0-layer-0.png", 2, 2, vec![1, 0, 1, 1], &own);
    write_rgba(dir.path(), "frame-1-layer-1.png", 3, 1, [200, 100, 50, 255]);
    let cfg = CelConfig::default();

    let scan = scan_png_files(dir.path(), &cfg).expect("scan");
    let (sprite, summary) = create_sprite_from_files(&scan, &cfg).expect("import");
    assert_eq!(summary.color_mode, ColorMode::Rgb);
    assert_eq!((sprite.width, sprite.height), (3, 2));

    let CelImage::Rgba(img) = &sprite.layers[0].cel(1).expect("cel").image else {
        panic!("expected RGBA cel");
    };
    assert_eq!(*img.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    assert_eq!(*img.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(img.dimensions(), (2, 2));

    let CelImage::Rgba(img) = &sprite.layers[1].cel(2).expect("cel").image else {
        panic!("expected RGBA cel");
    };
    assert_eq!(*img.get_pixel(2, 0), Rgba([200, 100, 50, 255]));
}

#[test]
fn mismatched_palettes_import_as_rgb() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = palette4();
    let mut b = palette4();
    b.colors[1] = [1, 2, 3, 255];
    write_indexed(dir.path(), "frame-1-layer-1.png", 1, 1, vec![1], &a);
    write_indexed(dir.path(), "frame-1-layer-2.png", 1, 1, vec![1], &b);
    let cfg = CelConfig::default();

    let scan = scan_png_files(dir.path(), &cfg).expect("scan");
    let (sprite, _) = create_sprite_from_files(&scan, &cfg).expect("import");
    assert_eq!(sprite.color_mode, ColorMode::Rgb);
    let px = |layer: usize| match &sprite.layers[layer].cel(1).expect("cel").image {
        CelImage::Rgba(img) => *img.get_pixel(0, 0),
        CelImage::Indexed(_) => panic!("expected RGBA cel"),
    };
    assert_eq!(px(0), Rgba([255, 0, 0, 255]));
    assert_eq!(px(1), Rgba([1, 2, 3, 255]));
}

#[test]
fn missing_frames_stay_empty_and_layers_follow_numbers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pal = palette4();
    write_indexed(dir.path(), "frame-1-layer-5.png", 1, 1, vec![1], &pal);
    write_indexed(dir.path(), "frame-4-layer-2.png", 1, 1, vec![2], &pal);
    let cfg = CelConfig::builder().layer_name_prefix("Part").build();

    let scan = scan_png_files(dir.path(), &cfg).expect("scan");
    let (sprite, summary) = create_sprite_from_files(&scan, &cfg).expect("import");
    assert_eq!(sprite.frames, 4);
    assert_eq!(summary.layers, 2);
    assert_eq!(sprite.layers[0].name, "Part 2");
    assert_eq!(sprite.layers[1].name, "Part 5");
    assert!(sprite.layers[0].cel(4).is_some());
    assert!(sprite.layers[1].cel(1).is_some());
    for frame in 2..=3 {
        assert!(sprite.layers.iter().all(|l| l.cel(frame).is_none()));
    }
}

#[test]
fn import_is_a_single_undo_step() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_indexed(dir.path(), "frame-1-layer-1.png", 1, 1, vec![1], &palette4());
    write_indexed(dir.path(), "frame-1-layer-2.png", 1, 1, vec![1], &palette4());
    let cfg = CelConfig::default();
    let scan = scan_png_files(dir.path(), &cfg).expect("scan");
    let (mut sprite, _) = create_sprite_from_files(&scan, &cfg).expect("import");

    assert!(sprite.is_modified());
    assert_eq!(sprite.history().undo_labels().count(), 1);
    sprite.undo().expect("undo import");
    assert!(sprite.layers.is_empty());
    assert!(!sprite.history().can_undo());
}

#[test]
fn nothing_decodable_is_an_empty_canvas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = dir.path().join("frame-1-layer-1.png");
    std::fs::write(&bad, b"garbage").expect("write");
    let scan = scan_png_paths(&[bad]).expect("scan");
    assert_eq!(scan.unreadable.len(), 1);
    assert!(matches!(
        create_sprite_from_files(&scan, &CelConfig::default()),
        Err(CelpackError::EmptyCanvas)
    ));
}

#[test]
fn an_empty_scan_is_an_empty_canvas() {
    let scan = ScanResult::default();
    assert!(matches!(
        create_sprite_from_files(&scan, &CelConfig::default()),
        Err(CelpackError::EmptyCanvas)
    ));
}
