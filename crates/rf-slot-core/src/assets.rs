//! Asset provider contract and a sequential loader
//!
//! The core never decodes textures. It only needs a keyed set of opaque
//! handles, fully resolved before the first spin. One failed fetch fails
//! the whole batch.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::AssetManifest;
use crate::error::{AssetError, FetchError};
use crate::symbols::SymbolId;

/// Keyed texture handles consumed by the presentation layer
pub trait AssetProvider {
    type Texture;

    /// Load every asset; any single failure aborts the batch
    fn load_all(&mut self) -> Result<&HashMap<String, Self::Texture>, AssetError>;

    fn texture(&self, key: &str) -> Option<&Self::Texture>;
}

/// Fetches one asset path into a texture handle
pub trait AssetFetcher {
    type Texture;

    fn fetch(&mut self, path: &str) -> Result<Self::Texture, FetchError>;
}

/// Texture key for a path: file name without directory or `.png`
///
/// `/assets/hv1_symbol.png` → `hv1_symbol`
pub fn texture_key(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".png").unwrap_or(name).to_string()
}

/// Texture key used for a reel symbol
pub fn symbol_texture_key(symbol: &SymbolId) -> String {
    format!("{symbol}_symbol")
}

type ProgressCallback = Box<dyn FnMut(u8)>;

/// Loads a manifest in order through an [`AssetFetcher`]
pub struct AssetLoader<F: AssetFetcher> {
    fetcher: F,
    paths: Vec<String>,
    textures: HashMap<String, F::Texture>,
    progress: u8,
    on_progress: Option<ProgressCallback>,
}

impl<F: AssetFetcher> AssetLoader<F> {
    pub fn new(manifest: &AssetManifest, fetcher: F) -> Self {
        Self {
            fetcher,
            paths: manifest.symbol_paths.clone(),
            textures: HashMap::new(),
            progress: 0,
            on_progress: None,
        }
    }

    /// Called with a 0–100 percentage after each asset
    pub fn set_progress_callback(&mut self, callback: impl FnMut(u8) + 'static) {
        self.on_progress = Some(Box::new(callback));
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_loaded(&self) -> bool {
        self.progress == 100
    }

    pub fn textures(&self) -> &HashMap<String, F::Texture> {
        &self.textures
    }

    fn update_progress(&mut self, loaded: usize, total: usize) {
        self.progress = ((loaded as f64 / total as f64) * 100.0).round() as u8;
        if let Some(callback) = self.on_progress.as_mut() {
            callback(self.progress);
        }
    }
}

impl<F: AssetFetcher> AssetProvider for AssetLoader<F> {
    type Texture = F::Texture;

    fn load_all(&mut self) -> Result<&HashMap<String, F::Texture>, AssetError> {
        let total = self.paths.len();
        if total == 0 {
            self.progress = 100;
            return Ok(&self.textures);
        }

        let paths = self.paths.clone();
        for (index, path) in paths.iter().enumerate() {
            match self.fetcher.fetch(path) {
                Ok(texture) => {
                    self.textures.insert(texture_key(path), texture);
                    self.update_progress(index + 1, total);
                }
                Err(source) => {
                    log::error!("Failed to load {path}: {source}");
                    return Err(AssetError::LoadFailed {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }

        log::info!("Loaded {} assets", self.textures.len());
        Ok(&self.textures)
    }

    fn texture(&self, key: &str) -> Option<&F::Texture> {
        self.textures.get(key)
    }
}

/// Reads asset bytes from a directory
///
/// Manifest paths are resolved relative to `root`, leading `/` ignored.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetFetcher for FileFetcher {
    type Texture = Vec<u8>;

    fn fetch(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path.trim_start_matches('/'));
        Ok(std::fs::read(full)?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Hands out the path length; fails on paths containing "broken"
    struct StubFetcher {
        fetched: Vec<String>,
    }

    impl AssetFetcher for StubFetcher {
        type Texture = usize;

        fn fetch(&mut self, path: &str) -> Result<usize, FetchError> {
            self.fetched.push(path.to_string());
            if path.contains("broken") {
                return Err(format!("404: {path}").into());
            }
            Ok(path.len())
        }
    }

    fn manifest(paths: &[&str]) -> AssetManifest {
        AssetManifest {
            symbol_paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_texture_key() {
        assert_eq!(texture_key("/assets/hv1_symbol.png"), "hv1_symbol");
        assert_eq!(texture_key("spin_button.png"), "spin_button");
        assert_eq!(texture_key("/assets/readme"), "readme");
        assert_eq!(symbol_texture_key(&"lv3".into()), "lv3_symbol");
    }

    #[test]
    fn test_loads_all_with_progress() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);

        let mut loader = AssetLoader::new(
            &manifest(&["/a/one.png", "/a/two.png", "/a/three.png", "/a/four.png"]),
            StubFetcher { fetched: Vec::new() },
        );
        loader.set_progress_callback(move |p| sink.borrow_mut().push(p));

        let textures = loader.load_all().unwrap();
        assert_eq!(textures.len(), 4);
        assert_eq!(loader.texture("three"), Some(&"/a/three.png".len()));
        assert!(loader.texture("five").is_none());
        assert!(loader.is_loaded());
        assert_eq!(*reports.borrow(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_single_failure_aborts_batch() {
        let mut loader = AssetLoader::new(
            &manifest(&["/a/one.png", "/a/broken.png", "/a/three.png"]),
            StubFetcher { fetched: Vec::new() },
        );

        let err = loader.load_all().unwrap_err();
        let AssetError::LoadFailed { path, .. } = err;
        assert_eq!(path, "/a/broken.png");
        assert!(!loader.is_loaded());
        assert_eq!(loader.fetcher.fetched.len(), 2);
    }

    #[test]
    fn test_empty_manifest_is_loaded() {
        let mut loader = AssetLoader::new(&manifest(&[]), StubFetcher { fetched: Vec::new() });
        assert!(loader.load_all().unwrap().is_empty());
        assert!(loader.is_loaded());
    }
}
