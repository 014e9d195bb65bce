use super::*;
use crate::foundation::core::{LayerTransform, Rgb8, Vec2};
use crate::layers::model::{LayerContent, ShapeKind};

fn spec(id: &str) -> NodeSpec {
    NodeSpec {
        id: LayerId::from(id),
        content: LayerContent::Shape {
            shape: ShapeKind::Rect,
            fill: Rgb8::new(0, 0, 0),
        },
        size: Vec2::new(1.0, 1.0),
    }
}

#[test]
fn calls_before_init_are_rejected() {
    let mut s = RecordingSurface::new();
    assert!(s.insert_node(0, &spec("a")).is_err());
    assert!(s.present().is_err());
    assert!(s.destroy().is_err());
}

#[test]
fn keeps_retained_order() {
    let mut s = RecordingSurface::new();
    s.init(Canvas::default(), Rgba8Premul::OPAQUE_WHITE).unwrap();
    s.insert_node(0, &spec("a")).unwrap();
    s.insert_node(1, &spec("b")).unwrap();
    s.insert_node(0, &spec("c")).unwrap();
    assert_eq!(s.order(), [&LayerId::from("c"), &LayerId::from("a"), &LayerId::from("b")]);

    s.move_node(&LayerId::from("c"), 2).unwrap();
    s.remove_node(&LayerId::from("a")).unwrap();
    assert_eq!(s.order(), [&LayerId::from("b"), &LayerId::from("c")]);
    assert!(s.insert_node(0, &spec("b")).is_err());
    assert!(s.remove_node(&LayerId::from("a")).is_err());
}

#[test]
fn records_updates_and_lifecycle() {
    let mut s = RecordingSurface::new();
    s.init(Canvas::default(), Rgba8Premul::OPAQUE_WHITE).unwrap();
    assert!(s.init(Canvas::default(), Rgba8Premul::OPAQUE_WHITE).is_err());
    s.insert_node(0, &spec("a")).unwrap();
    let props = NodeProps {
        transform: LayerTransform::default(),
        visible: true,
    };
    s.update_node(&LayerId::from("a"), &props).unwrap();
    assert_eq!(s.props(&LayerId::from("a")), Some(&props));
    s.set_stage_scale(1.5).unwrap();
    s.present().unwrap();
    s.destroy().unwrap();
    assert!(!s.is_live());
    assert_eq!(s.count(|op| matches!(op, SurfaceOp::Init { .. })), 1);
    assert_eq!(s.ops().last(), Some(&SurfaceOp::Destroy));
    assert_eq!(s.stage_scale(), 1.5);
}

#[test]
fn update_log_can_be_disabled() {
    let mut s = RecordingSurface::new().without_update_log();
    s.init(Canvas::default(), Rgba8Premul::OPAQUE_WHITE).unwrap();
    s.insert_node(0, &spec("a")).unwrap();
    s.update_node(
        &LayerId::from("a"),
        &NodeProps {
            transform: LayerTransform::default(),
            visible: false,
        },
    )
    .unwrap();
    s.present().unwrap();
    assert_eq!(s.ops().len(), 2);
}
