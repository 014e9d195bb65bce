use super::*;
use crate::foundation::core::{Rgb8, Vec2};
use crate::layers::model::{LayerContent, ShapeKind};
use crate::render::recording::{RecordingSurface, SurfaceOp};

fn layer(id: &str) -> Layer {
    Layer::new(
        id,
        LayerContent::Shape {
            shape: ShapeKind::Rect,
            fill: Rgb8::new(5, 5, 5),
        },
        Vec2::new(10.0, 10.0),
        Vec2::new(4.0, 4.0),
    )
}

fn store(ids: &[&str]) -> LayerStore {
    let mut s = LayerStore::new();
    for id in ids {
        s.add(layer(id)).unwrap();
    }
    s
}

fn mounted() -> Compositor<RecordingSurface> {
    Compositor::mount(
        RecordingSurface::new(),
        Canvas::default(),
        Rgba8Premul::OPAQUE_WHITE,
        100,
    )
    .unwrap()
}

fn order(c: &Compositor<RecordingSurface>) -> Vec<String> {
    c.surface().order().iter().map(|id| id.to_string()).collect()
}

#[test]
fn changes_are_incremental() {
    let mut s = store(&["a", "b", "c"]);
    let mut c = mounted();
    c.sync(&s, &[]).unwrap();
    assert_eq!(order(&c), ["a", "b", "c"]);

    s.reorder(2, 0).unwrap();
    c.sync(&s, &[]).unwrap();
    assert_eq!(order(&c), ["c", "a", "b"]);

    s.remove(&LayerId::from("a")).unwrap();
    s.add(layer("d")).unwrap();
    c.sync(&s, &[]).unwrap();
    assert_eq!(order(&c), ["c", "b", "d"]);

    let stats = c.stats();
    assert_eq!(stats.inits, 1);
    assert_eq!(stats.inserts, 4);
    assert_eq!(stats.removes, 1);
    assert_eq!(stats.moves, 1);
    assert_eq!(stats.presents, 3);
    assert_eq!(
        c.surface().count(|op| matches!(op, SurfaceOp::Init { .. })),
        1
    );
}

#[test]
fn zoom_is_one_stage_scale() {
    let s = store(&["a"]);
    let mut c = mounted();
    c.set_zoom(150).unwrap();
    c.sync(&s, &[]).unwrap();
    assert_eq!(c.surface().stage_scale(), 1.5);
    assert_eq!(c.stage_scale(), 1.5);
    // Node transforms are untouched by zoom.
    let props = c.surface().props(&LayerId::from("a")).unwrap();
    assert_eq!(props.transform.scale, 1.0);

    assert!(c.set_zoom(0).is_err());
    assert_eq!(c.stage_scale(), 1.5);
}

#[test]
fn combined_transforms_are_applied() {
    let s = store(&["a", "b"]);
    let mut c = mounted();
    let mut t = s.get(&LayerId::from("b")).unwrap().transform();
    t.rotation_rad = 0.75;
    let combined = CombinedTransform {
        layer: LayerId::from("b"),
        transform: t,
        active: Default::default(),
    };
    c.sync(&s, &[combined]).unwrap();
    assert_eq!(
        c.surface().props(&LayerId::from("b")).unwrap().transform.rotation_rad,
        0.75
    );
    assert_eq!(
        c.surface().props(&LayerId::from("a")).unwrap().transform.rotation_rad,
        0.0
    );
}

#[test]
fn visibility_is_forwarded() {
    let mut s = store(&["a"]);
    let mut c = mounted();
    s.toggle_visibility(&LayerId::from("a")).unwrap();
    c.sync(&s, &[]).unwrap();
    assert!(!c.surface().props(&LayerId::from("a")).unwrap().visible);
}

#[test]
fn content_change_rebuilds_only_that_node() {
    let mut s = store(&["a", "b"]);
    let mut c = mounted();
    c.sync(&s, &[]).unwrap();
    let mut replacement = s.remove(&LayerId::from("b")).unwrap();
    replacement.width = 99.0;
    s.add(replacement).unwrap();
    c.sync(&s, &[]).unwrap();
    assert_eq!(c.stats().inserts, 3);
    assert_eq!(c.stats().removes, 1);
    assert_eq!(order(&c), ["a", "b"]);
}

#[test]
fn unmount_destroys_once_and_blocks_sync() {
    let s = store(&["a"]);
    let mut c = mounted();
    c.sync(&s, &[]).unwrap();
    c.teardown().unwrap();
    c.teardown().unwrap();
    assert_eq!(c.stats().destroys, 1);
    assert!(c.sync(&s, &[]).is_err());
    let surface = c.unmount().unwrap();
    assert!(!surface.is_live());
}

#[test]
fn zero_zoom_fails_mount() {
    let err = Compositor::mount(
        RecordingSurface::new(),
        Canvas::default(),
        Rgba8Premul::OPAQUE_WHITE,
        0,
    )
    .unwrap_err();
    assert!(matches!(err, MotionError::Validation(_)));
}
