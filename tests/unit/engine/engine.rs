use serde_json::json;

use super::*;
use crate::effects::kind::EffectKind;
use crate::foundation::core::{Rgb8, Vec2};
use crate::layers::model::{Layer, LayerContent, ShapeKind};
use crate::render::recording::{RecordingSurface, SurfaceOp};

fn store() -> LayerStore {
    let mut s = LayerStore::new();
    for (id, x) in [("a", 100.0), ("b", 300.0)] {
        s.add(Layer::new(
            id,
            LayerContent::Shape {
                shape: ShapeKind::Rect,
                fill: Rgb8::new(1, 1, 1),
            },
            Vec2::new(x, 100.0),
            Vec2::new(50.0, 50.0),
        ))
        .unwrap();
    }
    s
}

fn engine() -> Engine<RecordingSurface> {
    Engine::mount(EngineOpts::default(), RecordingSurface::new()).unwrap()
}

#[test]
fn opts_are_validated() {
    let mut opts = EngineOpts::default();
    opts.zoom_percent = 0;
    assert!(matches!(
        Engine::mount(opts, RecordingSurface::new()),
        Err(MotionError::Validation(_))
    ));

    let mut opts = EngineOpts::default();
    opts.max_tick_secs = 0.0;
    assert!(opts.validate().is_err());

    let mut opts = EngineOpts::default();
    opts.canvas.width = 0;
    assert!(opts.validate().is_err());
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: EngineOpts =
        serde_json::from_value(json!({ "zoom_percent": 150, "seed": 7 })).unwrap();
    assert_eq!(opts.zoom_percent, 150);
    assert_eq!(opts.seed, 7);
    assert_eq!(opts.canvas, Canvas::default());
    assert_eq!(opts.max_tick_secs, 0.25);
}

#[test]
fn tick_paints_every_layer() {
    let s = store();
    let mut e = engine();
    let mut cfg = EffectConfiguration::new();
    cfg.enable("a", EffectKind::Rotate, json!({ "speed": 1.0 }));
    e.submit_settings(cfg);
    let report = e.tick(&s, 0.1).unwrap();
    assert_eq!(report.transforms.len(), 2);
    let props = e.surface().props(&LayerId::from("a")).unwrap();
    assert!((props.transform.rotation_rad - 0.1).abs() < 1e-12);
    assert_eq!(e.rendered(&LayerId::from("a")), Some(&props.transform));
}

#[test]
fn tick_at_measures_wall_clock() {
    let s = store();
    let mut e = engine();
    assert_eq!(e.tick_at(&s, 5.0).unwrap().dt, 0.0);
    assert!((e.tick_at(&s, 5.1).unwrap().dt - 0.1).abs() < 1e-9);
    let last = e.tick_at(&s, 50.0).unwrap();
    assert_eq!(last.dt, 0.25);
    assert_eq!(last.frame, 3);
}

#[test]
fn zoom_changes_stage_scale_only() {
    let s = store();
    let mut e = engine();
    e.set_zoom(50).unwrap();
    e.tick(&s, 0.0).unwrap();
    assert_eq!(e.zoom_percent(), 50);
    assert_eq!(e.surface().stage_scale(), 0.5);
    assert!(e.set_zoom(0).is_err());
    assert_eq!(e.zoom_percent(), 50);
}

#[test]
fn unmount_releases_before_destroy_and_is_idempotent() {
    let s = store();
    let mut e = engine();
    let mut cfg = EffectConfiguration::new();
    cfg.enable("a", EffectKind::Scale, json!({}));
    cfg.enable("b", EffectKind::Swing, json!({}));
    e.submit_settings(cfg);
    e.tick(&s, 0.016).unwrap();
    let probe = e.subscription_probe();
    assert_eq!(probe.outstanding(), 2);

    let report = e.unmount().unwrap();
    assert_eq!(
        report,
        UnmountReport {
            released: 2,
            outstanding: 0
        }
    );
    assert_eq!(probe.outstanding(), 0);
    assert!(!e.is_mounted());
    assert_eq!(e.surface().ops().last(), Some(&SurfaceOp::Destroy));

    assert_eq!(e.unmount().unwrap().released, 0);
    assert!(e.tick(&s, 0.016).is_err());
    assert_eq!(e.compositor_stats().destroys, 1);
}

#[test]
fn drop_unmounts() {
    let s = store();
    let mut e = engine();
    let mut cfg = EffectConfiguration::new();
    cfg.enable("a", EffectKind::Shake, json!({}));
    e.submit_settings(cfg);
    e.tick(&s, 0.016).unwrap();
    let probe = e.subscription_probe();
    drop(e);
    assert_eq!(probe.outstanding(), 0);
}

#[test]
fn settings_are_buffered_until_tick() {
    let s = store();
    let mut e = engine();
    let mut cfg = EffectConfiguration::new();
    cfg.enable("b", EffectKind::Fade, json!({}));
    e.submit_settings(cfg.clone());
    assert_eq!(e.settings(), &cfg);
    assert!(e.scheduler().instances().is_empty());
    e.tick(&s, 0.0).unwrap();
    assert_eq!(e.scheduler().instances().len(), 1);
}
