use super::*;

#[test]
fn release_is_idempotent() {
    let ticker = Ticker::new(0.25);
    let mut sub = ticker.subscribe();
    assert_eq!(ticker.outstanding(), 1);
    assert!(sub.is_active());
    assert!(sub.release());
    assert!(!sub.release());
    assert!(!sub.is_active());
    assert_eq!(ticker.outstanding(), 0);
    drop(sub);
    assert_eq!(ticker.probe().released(), 1);
}

#[test]
fn drop_releases() {
    let ticker = Ticker::new(0.25);
    let a = ticker.subscribe();
    let b = ticker.subscribe();
    assert_ne!(a.id(), b.id());
    drop(a);
    assert_eq!(ticker.outstanding(), 1);
    drop(b);
    assert_eq!(ticker.outstanding(), 0);
    assert_eq!(ticker.probe().issued(), 2);
}

#[test]
fn probe_outlives_ticker() {
    let ticker = Ticker::new(0.25);
    let probe = ticker.probe();
    let sub = ticker.subscribe();
    drop(ticker);
    assert_eq!(probe.outstanding(), 1);
    drop(sub);
    assert_eq!(probe.outstanding(), 0);
}

#[test]
fn advance_measures_and_clamps_elapsed_time() {
    let mut ticker = Ticker::new(0.25);
    assert_eq!(ticker.advance_to(10.0), 0.0);
    assert!((ticker.advance_to(10.016) - 0.016).abs() < 1e-12);
    assert_eq!(ticker.advance_to(12.0), 0.25);
    assert_eq!(ticker.advance_to(11.0), 0.0);
    assert_eq!(ticker.frame(), 0);
    assert_eq!(ticker.count_frame(), 1);
}

#[test]
fn clamp_rejects_non_finite() {
    let ticker = Ticker::new(0.0);
    assert_eq!(ticker.clamp_dt(f64::NAN), 0.0);
    assert_eq!(ticker.clamp_dt(5.0), 5.0);
}
