use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MotionError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        MotionError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        MotionError::export("job failed")
            .to_string()
            .contains("export error: job failed")
    );
    assert!(
        MotionError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
