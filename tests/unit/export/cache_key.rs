use super::*;
use crate::layers::model::BBox;

fn objects() -> Vec<DetectedObject> {
    vec![
        DetectedObject {
            label: "dog".into(),
            confidence: 0.91,
            bbox: BBox::new(10.0, 20.0, 30.0, 40.0),
        },
        DetectedObject {
            label: "cat".into(),
            confidence: 0.55,
            bbox: BBox::new(1.0, 2.0, 3.0, 4.0),
        },
    ]
}

#[test]
fn key_is_deterministic_and_formatted() {
    let a = CacheKey::new("uploads/p.png", "rotate", &objects()).unwrap();
    let b = CacheKey::new("uploads/p.png", "rotate", &objects()).unwrap();
    assert_eq!(a, b);
    let hash = format!("{:016x}", objects_fingerprint(&objects()));
    assert_eq!(a.as_str(), format!("uploads/p.png:rotate:{hash}"));
    assert_eq!(a.to_string(), a.as_str());
}

#[test]
fn key_changes_with_any_input() {
    let base = CacheKey::new("p.png", "rotate", &objects()).unwrap();
    assert_ne!(base, CacheKey::new("q.png", "rotate", &objects()).unwrap());
    assert_ne!(base, CacheKey::new("p.png", "fade", &objects()).unwrap());

    let mut moved = objects();
    moved[1].bbox.x += 0.5;
    assert_ne!(base, CacheKey::new("p.png", "rotate", &moved).unwrap());

    let mut swapped = objects();
    swapped.reverse();
    assert_ne!(objects_fingerprint(&objects()), objects_fingerprint(&swapped));
}

#[test]
fn signed_zero_hashes_equal() {
    let mut a = objects();
    a[0].bbox.x = 0.0;
    let mut b = objects();
    b[0].bbox.x = -0.0;
    assert_eq!(objects_fingerprint(&a), objects_fingerprint(&b));
}

#[test]
fn empty_fields_are_rejected() {
    assert!(matches!(
        CacheKey::new("", "rotate", &objects()),
        Err(MotionError::Validation(_))
    ));
    assert!(CacheKey::new("p.png", " ", &objects()).is_err());
    assert!(CacheKey::new("p.png", "rotate", &[]).is_err());
}
