use std::io::Cursor;

use avatar_viewer::{
    config::ViewerConfig,
    resources::{
        LoadEvent, LoadReporter, gltf_scene::parse_gltf, load_avatar, texture::decode_image,
    },
    viewer::textures::{Surface, TextureRegistry},
};
use futures::{StreamExt, channel::mpsc, executor::block_on};
use image::{ImageFormat, RgbaImage};

use crate::common::test_utils::{assert_close, avatar_glb, rig_glb};

mod common;

fn drain(receiver: mpsc::UnboundedReceiver<LoadEvent>) -> Vec<LoadEvent> {
    block_on(receiver.collect::<Vec<_>>())
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn progress_is_sent_once_per_whole_percent() {
    let (sender, receiver) = mpsc::unbounded();
    let mut reporter = LoadReporter::new(sender);
    reporter.progress(1, Some(1000));
    reporter.progress(5, Some(1000));
    reporter.progress(10, Some(1000));
    reporter.progress(500, None);
    reporter.progress(1000, Some(1000));
    reporter.finish(Err(anyhow::anyhow!("gone")));

    let events = drain(receiver);
    let progress = events
        .iter()
        .filter_map(|e| match e {
            LoadEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(progress.len(), 3);
    assert_close(progress[1], 0.01);
    assert_close(progress[2], 1.0);
    assert!(matches!(events.last(), Some(LoadEvent::Failed(_))));
}

#[test]
fn parses_an_embedded_glb() {
    let asset = block_on(parse_gltf(&avatar_glb(), ".")).unwrap();
    let scene = &asset.scene;

    let body = scene.find_by_name("Wolf3D_Body").unwrap();
    let drawable = scene.drawable(body).unwrap();
    assert_eq!(drawable.mesh.vertices.len(), 3);
    assert_eq!(drawable.mesh.indices, vec![0, 1, 2]);
    let bounds = scene.bounding_box().unwrap();
    assert_eq!(bounds.min, [-2.0, 0.0, -1.0].into());
    assert_eq!(bounds.max, [2.0, 4.0, 1.0].into());
    for vertex in &drawable.mesh.vertices {
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
    }

    let armature = scene.find_by_name("Armature").unwrap();
    let hand = scene.find_by_name("RightHand").unwrap();
    assert_eq!(scene.get(hand).unwrap().parent, Some(armature));
    assert_eq!(scene.drawables(), vec![body]);

    assert_eq!(asset.animations.len(), 1);
    let clip = &asset.animations[0];
    assert_eq!(clip.name, "hand_lift");
    assert_close(clip.duration, 1.0);

    let mut scene = asset.scene;
    clip.apply(&mut scene, 0.5);
    assert_close(scene.get(hand).unwrap().transform.position.y, 1.5);
}

#[test]
fn skin_keeps_one_slot_per_joint() {
    let asset = block_on(parse_gltf(&rig_glb(), ".")).unwrap();
    let scene = &asset.scene;
    assert_eq!(scene.find_by_name("Stray"), None);

    let eye = scene.find_by_name("EyeLeft").unwrap();
    let hand = scene.find_by_name("RightHand").unwrap();
    let skin = scene.drawable(eye).unwrap().skin.as_ref().unwrap();
    assert_eq!(skin.joints, vec![scene.root(), hand]);
}

#[test]
fn instanced_meshes_get_their_own_material_state() {
    let mut scene = block_on(parse_gltf(&rig_glb(), ".")).unwrap().scene;
    let left = scene.find_by_name("EyeLeft").unwrap();
    let right = scene.find_by_name("EyeRight").unwrap();
    assert_eq!(scene.drawable(left).unwrap().material.name, "Wolf3D_Eye");
    assert_eq!(scene.drawable(right).unwrap().material.name, "Wolf3D_Eye");

    let material = &mut scene.drawable_mut(left).unwrap().material;
    material.wireframe = true;
    material.visible = false;

    let other = &scene.drawable(right).unwrap().material;
    assert!(!other.wireframe);
    assert!(other.visible);
}

#[test]
fn rejects_garbage() {
    assert!(block_on(parse_gltf(b"definitely not gltf", ".")).is_err());
}

#[test]
fn load_avatar_reports_progress_then_exactly_one_result() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("avatar.glb"), avatar_glb()).unwrap();
    let assets = dir.path().to_string_lossy().to_string();

    let (sender, receiver) = mpsc::unbounded();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(load_avatar(
        assets,
        "avatar.glb".to_string(),
        LoadReporter::new(sender),
    ));

    let events = drain(receiver);
    let finished = events
        .iter()
        .filter(|e| matches!(e, LoadEvent::Loaded(_) | LoadEvent::Failed(_)))
        .count();
    assert_eq!(finished, 1);
    assert!(matches!(events.first(), Some(LoadEvent::Progress(_))));
    match events.last() {
        Some(LoadEvent::Loaded(asset)) => {
            assert!(asset.scene.find_by_name("Wolf3D_Body").is_some());
        }
        other => panic!("expected a loaded asset, got {other:?}"),
    }
}

#[test]
fn load_avatar_fails_for_a_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let (sender, receiver) = mpsc::unbounded();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(load_avatar(
        dir.path().to_string_lossy().to_string(),
        "missing.glb".to_string(),
        LoadReporter::new(sender),
    ));

    let events = drain(receiver);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoadEvent::Failed(_)));
}

#[test]
fn decodes_images_by_content() {
    let image = decode_image(&png_bytes(), None).unwrap();
    assert_eq!(image.dimensions(), (2, 2));
    assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert!(decode_image(b"nope", Some("image/png")).is_err());
}

#[test]
fn registry_fills_handles_as_files_arrive() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("body_texture.jpeg"), png_bytes()).unwrap();
    let config = ViewerConfig {
        assets: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };

    let (registry, tasks) = TextureRegistry::request(&config);
    assert!(Surface::ALL.iter().all(|s| registry.get(*s).is_some()));
    assert_eq!(tasks.len(), 17);

    let body = registry.get(Surface::Body).unwrap().base_color.clone().unwrap();
    let hair = registry.get(Surface::Hair).unwrap().normal.clone().unwrap();
    assert!(!body.is_ready());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(futures::future::join_all(tasks));

    assert!(body.is_ready());
    assert_eq!(body.get().unwrap().dimensions(), (2, 2));
    // missing files stay pending
    assert!(!hair.is_ready());
    assert!(registry.get(Surface::Eyes).unwrap().normal.is_none());
}
