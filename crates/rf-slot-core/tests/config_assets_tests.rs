//! Config files on disk and asset loading through the file fetcher

use std::fs;

use rf_slot_core::{
    AssetError, AssetLoader, AssetManifest, AssetProvider, ConfigError, FileFetcher, SlotConfig,
    symbol_texture_key,
};

#[test]
fn loads_json_and_yaml_configs_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = SlotConfig::classic();

    let json_path = dir.path().join("game.json");
    fs::write(&json_path, config.to_json_string().unwrap()).unwrap();
    assert_eq!(SlotConfig::from_path(&json_path).unwrap(), config);

    let yaml_path = dir.path().join("game.yml");
    fs::write(&yaml_path, serde_yml::to_string(&config).unwrap()).unwrap();
    assert_eq!(SlotConfig::from_path(&yaml_path).unwrap(), config);
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("game.toml");
    fs::write(&toml_path, "grid = 1").unwrap();
    assert!(matches!(
        SlotConfig::from_path(&toml_path),
        Err(ConfigError::UnsupportedFormat(_))
    ));

    assert!(matches!(
        SlotConfig::from_path(dir.path().join("absent.json")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn invalid_json_config_reports_validation() {
    let json = r#"{
        "grid": { "columns": 2, "rows": 1 },
        "bands": [["A", "B"], ["A", "B"]],
        "initial_positions": [0, 0],
        "pay_table": { "A": { "2": 4.0 } },
        "pay_lines": [[[0, 0], [0, 1], [0, 2]]]
    }"#;

    let err = SlotConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn file_fetcher_loads_manifest_keyed_by_stem() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/hv1_symbol.png"), b"hv1").unwrap();
    fs::write(dir.path().join("assets/spin_button.png"), b"spin").unwrap();

    let manifest = AssetManifest {
        symbol_paths: vec![
            "/assets/hv1_symbol.png".to_string(),
            "/assets/spin_button.png".to_string(),
        ],
    };
    let mut loader = AssetLoader::new(&manifest, FileFetcher::new(dir.path()));

    let textures = loader.load_all().unwrap();
    assert_eq!(textures.len(), 2);
    assert_eq!(
        loader.texture(&symbol_texture_key(&"hv1".into())).map(Vec::as_slice),
        Some(&b"hv1"[..])
    );
    assert_eq!(loader.texture("spin_button").map(Vec::len), Some(4));
    assert!(loader.is_loaded());
}

#[test]
fn missing_asset_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hv1_symbol.png"), b"hv1").unwrap();

    let mut loader = AssetLoader::new(&AssetManifest::classic(), FileFetcher::new(dir.path()));
    let err = loader.load_all().unwrap_err();

    let AssetError::LoadFailed { path, .. } = &err;
    assert_eq!(path, "/assets/hv1_symbol.png");
    assert!(err.to_string().contains("Asset loading failed"));
    assert!(!loader.is_loaded());
}
