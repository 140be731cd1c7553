//! Tests for palette configuration loading.

use tile_codec::{ErrorKind, Palette, Rgb};

#[test]
fn test_palette_from_yaml() {
    let yaml = r#"
purple: [82, 82, 182]
orange: [255, 140, 0]
"#;
    let palette: Palette = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(palette.len(), 2);
    assert_eq!(palette.lookup("orange").unwrap(), Rgb(255, 140, 0));
    assert_eq!(
        palette.lookup("green").unwrap_err().kind(),
        ErrorKind::InvalidParameter
    );
}

#[test]
fn test_palette_yaml_rejects_duplicate_colors() {
    let yaml = r#"
purple: [82, 82, 182]
violet: [82, 82, 182]
"#;
    let err = serde_yaml::from_str::<Palette>(yaml).unwrap_err();
    assert!(err.to_string().contains("already used"), "{}", err);
}

#[test]
fn test_palette_yaml_rejects_bad_channels() {
    assert!(serde_yaml::from_str::<Palette>("red: [300, 0, 0]").is_err());
    assert!(serde_yaml::from_str::<Palette>("red: [255, 0]").is_err());
    assert!(serde_yaml::from_str::<Palette>("{}").is_err());
}

#[test]
fn test_palette_serializes_as_map() {
    let yaml = serde_yaml::to_string(&Palette::default()).unwrap();
    let back: Palette = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, Palette::default());
    assert!(yaml.contains("purple"));
}
