mod common;

use celpack_core::error::CelpackError;
use celpack_core::prelude::*;
use celpack_core::{SourceImage, export_file_name, read_png};
use common::{banked_palette, gray, indexed_sprite};
use std::fs;

fn two_layer_sprite() -> Sprite {
    let mut sprite = indexed_sprite(
        4,
        2,
        vec![
            ("body", Point::new(0, 0), gray(2, 2, vec![1, 2, 0, 3])),
            ("arm", Point::new(1, 1), gray(3, 1, vec![17, 33, 0])),
        ],
    );
    sprite.frames = 2;
    sprite.layer_mut(1).expect("layer").insert_cel(Cel {
        frame: 2,
        position: Point::new(0, 0),
        image: CelImage::Indexed(gray(1, 1, vec![16])),
    });
    sprite
}

#[test]
fn export_names_follow_frame_and_layer() {
    assert_eq!(export_file_name(1, 1), "Frame-1-Layer-1.png");
    assert_eq!(export_file_name(12, 3), "Frame-12-Layer-3.png");
}

#[test]
fn refuses_missing_unsaved_and_modified_sprites() {
    assert!(matches!(check_exportable(None), Err(CelpackError::NoActiveSprite)));

    let sprite = two_layer_sprite();
    assert!(matches!(
        check_exportable(Some(&sprite)),
        Err(CelpackError::UnsavedSprite)
    ));
    let scan = scan_cels(&sprite, &CelConfig::default()).expect("scan");
    assert!(matches!(
        export_all_cels(&sprite, &scan),
        Err(CelpackError::UnsavedSprite)
    ));
}

#[test]
fn modified_sprite_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sprite = two_layer_sprite();
    save_sprite(&mut sprite, &dir.path().join("hero.celpack")).expect("save");
    sprite
        .apply("rename", |s| {
            s.layers[0].name = "torso".into();
            Ok(())
        })
        .expect("edit");

    let scan = scan_cels(&sprite, &CelConfig::default()).expect("scan");
    assert!(matches!(
        export_all_cels(&sprite, &scan),
        Err(CelpackError::ModifiedSprite)
    ));
    assert!(!dir.path().join("hero").exists());
}

#[test]
fn every_non_empty_cel_is_written_with_the_sprite_palette() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sprite = two_layer_sprite();
    let doc = dir.path().join("hero.celpack");
    save_sprite(&mut sprite, &doc).expect("save");
    assert_eq!(export_dir(&sprite).expect("dir"), dir.path().join("hero"));

    let scan = scan_cels(&sprite, &CelConfig::default()).expect("scan");
    assert_eq!(scan.empty_cels, 1);
    let summary = export_all_cels(&sprite, &scan).expect("export");

    let mut names: Vec<String> = fs::read_dir(&summary.dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Frame-1-Layer-1.png", "Frame-1-Layer-2.png"]);
    assert_eq!(summary.count(), 2);

    match read_png(&summary.dir.join("Frame-1-Layer-2.png")).expect("read back") {
        SourceImage::Indexed { indices, palette } => {
            // cel size, not canvas size
            assert_eq!(indices.dimensions(), (3, 1));
            assert_eq!(indices.as_raw(), &vec![17, 33, 0]);
            assert_eq!(palette, banked_palette());
        }
        SourceImage::Rgba(_) => panic!("expected an indexed PNG"),
    }
}

#[test]
fn export_overwrites_previous_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sprite = two_layer_sprite();
    save_sprite(&mut sprite, &dir.path().join("hero.celpack")).expect("save");
    let out = dir.path().join("hero");
    fs::create_dir_all(&out).expect("mkdir");
    fs::write(out.join("Frame-1-Layer-1.png"), b"stale").expect("write");

    let scan = scan_cels(&sprite, &CelConfig::default()).expect("scan");
    export_all_cels(&sprite, &scan).expect("export");
    assert!(read_png(&out.join("Frame-1-Layer-1.png")).is_ok());
}

#[test]
fn manifest_lists_written_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sprite = two_layer_sprite();
    save_sprite(&mut sprite, &dir.path().join("hero.celpack")).expect("save");
    let scan = scan_cels(&sprite, &CelConfig::default()).expect("scan");
    let summary = export_all_cels(&sprite, &scan).expect("export");

    let manifest = export_manifest(&summary, &scan);
    assert_eq!(manifest["count"], 2);
    let files = manifest["files"].as_array().expect("files");
    assert_eq!(files[0]["file"], "Frame-1-Layer-1.png");
    assert_eq!(files[0]["layerName"], "body");
    assert_eq!(files[0]["bank"], 1);
    assert_eq!(files[0]["mixed"], false);
    assert_eq!(files[1]["layer"], 2);
    assert!(files[1]["bank"].is_null());
    assert_eq!(files[1]["mixed"], true);
}
