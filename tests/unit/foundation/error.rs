use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramestripError::decode("a.png", "bad header")
            .to_string()
            .contains("decode error: 'a.png'")
    );
    assert!(
        FramestripError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FramestripError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        FramestripError::InvalidSplitFactor { x: 0, y: 1 }
            .to_string()
            .contains("0x1")
    );
}

#[test]
fn validation_joins_reasons() {
    let err = FramestripError::Validation(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(err.to_string(), "validation error: a; b");
    assert_eq!(err.reasons().len(), 2);
    assert!(FramestripError::evaluation("x").reasons().is_empty());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramestripError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
