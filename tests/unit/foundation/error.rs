use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RasterError::invalid_config("x")
            .to_string()
            .contains("invalid configuration:")
    );
    assert!(
        RasterError::threading("x")
            .to_string()
            .contains("threading error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RasterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
