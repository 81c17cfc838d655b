use avatar_viewer::{
    config::{MESH_SURFACES, TEXTURE_FILES},
    data_structures::image::ImageHandle,
    viewer::{
        binder::apply_textures,
        textures::{GLOSS_ROUGHNESS, Surface, TextureRegistry, TextureSet, surface_for_mesh},
    },
};
use image::RgbaImage;

use crate::common::test_utils::avatar_graph;

mod common;

fn ready(label: &str) -> Option<ImageHandle> {
    Some(ImageHandle::ready(label, RgbaImage::new(1, 1)))
}

/// A registry shaped like the packaged one, with images already decoded.
fn ready_registry() -> TextureRegistry {
    TextureRegistry::from_sets(TEXTURE_FILES.iter().map(|(surface, files)| {
        let set = TextureSet {
            base_color: files.base_color.and_then(ready),
            normal: files.normal.and_then(ready),
            gloss: files.gloss.and_then(ready),
        };
        (*surface, set)
    }))
}

#[test]
fn every_known_mesh_maps_to_a_surface() {
    assert_eq!(surface_for_mesh("Wolf3D_Body"), Some(Surface::Body));
    assert_eq!(surface_for_mesh("EyeLeft"), Some(Surface::Eyes));
    assert_eq!(surface_for_mesh("EyeRight"), Some(Surface::Eyes));
    assert_eq!(surface_for_mesh("Wolf3D_Head"), Some(Surface::Face));
    assert_eq!(surface_for_mesh("Wolf3D_Outfit_Top"), Some(Surface::Shirt));
    assert_eq!(surface_for_mesh("Wolf3D_Outfit_Bottom"), Some(Surface::Pants));
    assert_eq!(surface_for_mesh("Wolf3D_Outfit_Footwear"), Some(Surface::Shoes));
    assert_eq!(surface_for_mesh("wolf3d_body"), None);
    assert_eq!(surface_for_mesh(""), None);

    for surface in Surface::ALL {
        assert!(
            TEXTURE_FILES.iter().any(|(s, _)| *s == surface),
            "no files for {}",
            surface.label()
        );
    }
}

#[test]
fn known_meshes_receive_exactly_their_registry_entry() {
    let mut fixture = avatar_graph();
    let registry = ready_registry();

    let touched = apply_textures(&mut fixture.graph, &registry);
    assert_eq!(touched, MESH_SURFACES.len());

    for (name, surface) in MESH_SURFACES {
        let id = fixture.graph.find_by_name(name).unwrap();
        let material = &fixture.graph.drawable(id).unwrap().material;
        let set = registry.get(surface).unwrap();
        assert_eq!(material.map, set.base_color, "{name} colour");
        assert_eq!(material.normal_map, set.normal, "{name} normal");
        assert_eq!(material.roughness_map, set.gloss, "{name} roughness");
        if set.gloss.is_some() {
            assert_eq!(material.roughness, GLOSS_ROUGHNESS);
        } else {
            assert_eq!(material.roughness, 1.0);
        }
        assert!(material.needs_update);
    }
}

#[test]
fn unknown_meshes_are_left_alone() {
    let mut fixture = avatar_graph();
    let before = fixture.graph.drawable(fixture.unknown).unwrap().material.clone();

    apply_textures(&mut fixture.graph, &ready_registry());

    let after = &fixture.graph.drawable(fixture.unknown).unwrap().material;
    assert_eq!(after.map, None);
    assert_eq!(after.normal_map, None);
    assert_eq!(after.roughness_map, None);
    assert_eq!(after.roughness, before.roughness);
    assert_eq!(after.color, before.color);
}

#[test]
fn empty_registry_binds_nothing() {
    let mut fixture = avatar_graph();
    assert_eq!(apply_textures(&mut fixture.graph, &TextureRegistry::default()), 0);
    let body = fixture.graph.find_by_name("Wolf3D_Body").unwrap();
    assert!(fixture.graph.drawable(body).unwrap().material.map.is_none());
}

#[test]
fn pending_handles_are_shared_with_materials() {
    let mut fixture = avatar_graph();
    let pending = ImageHandle::pending("body_texture.jpeg");
    let registry = TextureRegistry::from_sets([(
        Surface::Body,
        TextureSet {
            base_color: Some(pending.clone()),
            ..Default::default()
        },
    )]);
    apply_textures(&mut fixture.graph, &registry);

    let body = fixture.graph.find_by_name("Wolf3D_Body").unwrap();
    let bound = fixture.graph.drawable(body).unwrap().material.map.clone().unwrap();
    assert!(!bound.is_ready());

    assert!(pending.fill(RgbaImage::new(2, 2)));
    assert!(bound.is_ready());
    assert!(!pending.fill(RgbaImage::new(2, 2)));
}
