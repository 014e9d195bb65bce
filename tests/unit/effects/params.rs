use super::*;
use serde_json::json;

#[test]
fn missing_params_use_documented_defaults() {
    let EffectParams::Scale(s) = EffectParams::defaults(EffectKind::Scale) else {
        panic!("expected scale params");
    };
    assert_eq!(s.min_scale, defaults::SCALE_MIN);
    assert_eq!(s.max_scale, defaults::SCALE_MAX);
    assert_eq!(s.speed, defaults::SCALE_SPEED);

    let EffectParams::Swing(w) = EffectParams::defaults(EffectKind::Swing) else {
        panic!("expected swing params");
    };
    assert_eq!(w.angle, 15.0);
}

#[test]
fn every_kind_round_trips_through_defaults() {
    for kind in EffectKind::ALL {
        assert_eq!(EffectParams::defaults(kind).kind(), kind);
    }
}

#[test]
fn invalid_fields_fall_back_individually() {
    let p = EffectParams::from_json(
        EffectKind::Translate,
        &json!({"distance": -3.0, "speed": "fast", "direction": "vertical"}),
    );
    let EffectParams::Translate(t) = p else {
        panic!("expected translate params");
    };
    assert_eq!(t.distance, defaults::TRANSLATE_DISTANCE);
    assert_eq!(t.speed, defaults::TRANSLATE_SPEED);
    assert_eq!(t.direction, TranslateAxis::Vertical);
}

#[test]
fn inverted_range_falls_back_to_both_defaults() {
    let p = EffectParams::from_json(
        EffectKind::Fade,
        &json!({"minOpacity": 0.9, "maxOpacity": 0.2, "speed": 0.5}),
    );
    let EffectParams::Fade(f) = p else {
        panic!("expected fade params");
    };
    assert_eq!((f.min_opacity, f.max_opacity), (0.0, 1.0));
    assert_eq!(f.speed, 0.5);
}

#[test]
fn fade_bounds_outside_unit_interval_are_rejected() {
    let p = EffectParams::from_json(EffectKind::Fade, &json!({"minOpacity": -1, "maxOpacity": 4}));
    let EffectParams::Fade(f) = p else {
        panic!("expected fade params");
    };
    assert_eq!((f.min_opacity, f.max_opacity), (0.0, 1.0));
}

#[test]
fn snake_case_keys_and_direction_spellings_are_accepted() {
    let p = EffectParams::from_json(
        EffectKind::Scale,
        &json!({"min_scale": 0.8, "max_scale": 1.2}),
    );
    assert_eq!(
        p,
        EffectParams::Scale(ScaleParams {
            min_scale: 0.8,
            max_scale: 1.2,
            speed: defaults::SCALE_SPEED,
        })
    );

    let p = EffectParams::from_json(EffectKind::Rotate, &json!({"direction": "Counter-Clockwise"}));
    let EffectParams::Rotate(r) = p else {
        panic!("expected rotate params");
    };
    assert_eq!(r.direction, RotateDirection::Counterclockwise);
    assert_eq!(r.direction.sign(), -1.0);
}

#[test]
fn non_object_params_are_treated_as_empty() {
    assert_eq!(
        EffectParams::from_json(EffectKind::Shake, &json!([1, 2, 3])),
        EffectParams::defaults(EffectKind::Shake)
    );
}

#[test]
fn diagonal_axis_is_unit_length() {
    let (x, y) = TranslateAxis::Diagonal.unit();
    assert!(((x * x + y * y) - 1.0).abs() < 1e-12);
}
