use std::io::Cursor;

use super::*;
use crate::foundation::core::{LayerTransform, Vec2};

fn shape_node(id: &str, shape: ShapeKind, fill: Rgb8, size: f64) -> NodeSpec {
    NodeSpec {
        id: LayerId::from(id),
        content: LayerContent::Shape { shape, fill },
        size: Vec2::new(size, size),
    }
}

fn props_at(x: f64, y: f64) -> NodeProps {
    NodeProps {
        transform: LayerTransform {
            position: Vec2::new(x, y),
            ..LayerTransform::default()
        },
        visible: true,
    }
}

fn surface(w: u32, h: u32) -> CpuSurface {
    let mut s = CpuSurface::new(std::env::temp_dir());
    s.init(Canvas::new(w, h).unwrap(), Rgba8Premul::OPAQUE_WHITE)
        .unwrap();
    s
}

#[test]
fn present_before_init_errors() {
    let mut s = CpuSurface::new(".");
    assert!(s.present().is_err());
}

#[test]
fn draws_rect_over_background() {
    let mut s = surface(20, 20);
    s.insert_node(0, &shape_node("a", ShapeKind::Rect, Rgb8::new(255, 0, 0), 10.0))
        .unwrap();
    s.update_node(&LayerId::from("a"), &props_at(10.0, 10.0))
        .unwrap();
    s.present().unwrap();
    let f = s.frame().unwrap();
    assert_eq!((f.width, f.height), (20, 20));
    assert!(f.premultiplied);
    assert_eq!(f.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(20, 0), None);
}

#[test]
fn hidden_and_unplaced_nodes_are_skipped() {
    let mut s = surface(8, 8);
    s.insert_node(0, &shape_node("a", ShapeKind::Rect, Rgb8::new(0, 0, 0), 8.0))
        .unwrap();
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(4, 4), Some([255, 255, 255, 255]));

    let mut p = props_at(4.0, 4.0);
    p.visible = false;
    s.update_node(&LayerId::from("a"), &p).unwrap();
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(4, 4), Some([255, 255, 255, 255]));
}

#[test]
fn stage_scale_zooms_whole_scene() {
    let mut s = surface(40, 40);
    s.insert_node(0, &shape_node("a", ShapeKind::Rect, Rgb8::new(0, 0, 255), 10.0))
        .unwrap();
    s.update_node(&LayerId::from("a"), &props_at(5.0, 5.0))
        .unwrap();
    s.set_stage_scale(2.0).unwrap();
    s.present().unwrap();
    let f = s.frame().unwrap();
    assert_eq!(f.pixel(15, 15), Some([0, 0, 255, 255]));
    assert_eq!(f.pixel(25, 25), Some([255, 255, 255, 255]));
    assert!(s.set_stage_scale(0.0).is_err());
}

#[test]
fn paint_order_follows_node_order() {
    let mut s = surface(10, 10);
    s.insert_node(0, &shape_node("red", ShapeKind::Rect, Rgb8::new(255, 0, 0), 10.0))
        .unwrap();
    s.insert_node(1, &shape_node("green", ShapeKind::Rect, Rgb8::new(0, 255, 0), 10.0))
        .unwrap();
    for id in ["red", "green"] {
        s.update_node(&LayerId::from(id), &props_at(5.0, 5.0)).unwrap();
    }
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(5, 5), Some([0, 255, 0, 255]));

    s.move_node(&LayerId::from("red"), 1).unwrap();
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(5, 5), Some([255, 0, 0, 255]));
}

#[test]
fn tint_and_opacity_apply() {
    let mut s = surface(10, 10);
    s.insert_node(0, &shape_node("a", ShapeKind::Ellipse, Rgb8::WHITE, 10.0))
        .unwrap();
    let mut p = props_at(5.0, 5.0);
    p.transform.tint = Some(Rgb8::new(0, 255, 0));
    s.update_node(&LayerId::from("a"), &p).unwrap();
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(5, 5), Some([0, 255, 0, 255]));

    p.transform.tint = None;
    p.transform.opacity = 0.0;
    s.update_node(&LayerId::from("a"), &p).unwrap();
    s.present().unwrap();
    assert_eq!(s.frame().unwrap().pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn image_layers_are_cropped_and_stretched() {
    let dir = std::env::temp_dir().join(format!("layermotion-cpu-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    // Left half red, right half blue.
    let mut rgba = Vec::new();
    for _y in 0..4 {
        for x in 0..4 {
            rgba.extend_from_slice(if x < 2 { &[255, 0, 0, 255] } else { &[0, 0, 255, 255] });
        }
    }
    let img = image::RgbaImage::from_raw(4, 4, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("photo.png"), buf).unwrap();

    let mut s = CpuSurface::new(&dir);
    s.init(Canvas::new(16, 16).unwrap(), Rgba8Premul::OPAQUE_WHITE)
        .unwrap();
    s.insert_node(
        0,
        &NodeSpec {
            id: LayerId::from("blue-0"),
            content: LayerContent::Image {
                src: "photo.png".into(),
                crop: Some(Rect::new(2.0, 0.0, 4.0, 4.0)),
            },
            size: Vec2::new(16.0, 16.0),
        },
    )
    .unwrap();
    s.update_node(&LayerId::from("blue-0"), &props_at(8.0, 8.0))
        .unwrap();
    s.present().unwrap();
    let f = s.take_frame().unwrap();
    assert_eq!(f.pixel(8, 8), Some([0, 0, 255, 255]));
    assert!(s.frame().is_none());

    let missing = NodeSpec {
        id: LayerId::from("x"),
        content: LayerContent::Image {
            src: "nope.png".into(),
            crop: None,
        },
        size: Vec2::new(1.0, 1.0),
    };
    assert!(s.insert_node(0, &missing).is_err());
    s.destroy().unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn tint_multiplies_channels() {
    let mut px = vec![200, 100, 50, 200];
    tint_rgba8_premul_in_place(&mut px, Rgb8::new(255, 0, 128));
    assert_eq!(px, [200, 0, 25, 200]);
    assert_eq!(
        tint_rgb(Rgb8::new(255, 255, 255), Rgb8::new(10, 20, 30)),
        Rgb8::new(10, 20, 30)
    );
}
