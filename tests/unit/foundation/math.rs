use super::*;

#[test]
fn fnv_seeded_hash_is_stable_and_separates_fields() {
    let mut a = Fnv1a64::new(7);
    a.write_str("ab");
    a.write_str("c");
    let mut b = Fnv1a64::new(7);
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish(), b.finish());

    let mut c = Fnv1a64::new(7);
    c.write_str("ab");
    c.write_str("c");
    assert_eq!(a.finish(), c.finish());
}

#[test]
fn rng_is_deterministic_and_in_unit_interval() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..100 {
        let v = a.next_f64_01();
        assert_eq!(v, b.next_f64_01());
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn ping_pong_lands_on_bounds_and_flips() {
    let (v, d) = ping_pong_step(0.9, 1.0, 0.5, 1.0, 0.3);
    assert_eq!((v, d), (1.0, -1.0));
    let (v, d) = ping_pong_step(v, d, 0.5, 1.0, 0.3);
    assert!((v - 0.7).abs() < 1e-12);
    assert_eq!(d, -1.0);
    let (v, d) = ping_pong_step(v, d, 0.5, 1.0, 0.3);
    assert_eq!((v, d), (0.5, 1.0));
}

#[test]
fn ping_pong_clamps_out_of_range_start() {
    let (v, _) = ping_pong_step(5.0, 1.0, 0.0, 1.0, 0.0);
    assert_eq!(v, 1.0);
    let (v, _) = ping_pong_step(-5.0, -1.0, 0.0, 1.0, 0.1);
    assert_eq!(v, 0.0);
}

#[test]
fn hsl_primaries() {
    assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb8::new(255, 0, 0));
    assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Rgb8::new(0, 255, 0));
    assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Rgb8::new(0, 0, 255));
    assert_eq!(hsl_to_rgb(1.0, 1.0, 0.5), Rgb8::new(255, 0, 0));
    assert_eq!(hsl_to_rgb(0.3, 0.0, 0.5), Rgb8::new(128, 128, 128));
}
