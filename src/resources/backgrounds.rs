//! Background variant discovery.
//!
//! Environment art lives under
//! `<root>/backgrounds/environmentsnew/01_file_island/<NN>_<env>/` as
//! `<env>_<layer>_v<N>.png`. Each layer has a handful of variants; one
//! existing variant per layer is picked with a seeded RNG.

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::Resource;
use log::{debug, warn};

const VARIANT_BASE_DIR: &str = "backgrounds/environmentsnew";
const CONTINENT_DIR: &str = "01_file_island";
const DEFAULT_ENVIRONMENT: &str = "tropicaljungle";

/// Known environments and their directory names.
const ENVIRONMENTS: [(&str, &str); 6] = [
    ("tropicaljungle", "01_tropicaljungle"),
    ("lake", "02_lake"),
    ("gearsavannah", "03_gearsavannah"),
    ("factorialtown", "04_factorialtown"),
    ("toytown", "05_toytown"),
    ("infinitymountain", "06_infinitymountain"),
];

/// Parallax layer of the environment art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Front layer (L0).
    Foreground,
    /// Middle layer (L1).
    Midground,
    /// Back layer (L2).
    Background,
}

impl LayerKind {
    /// Front to back.
    pub const ALL: [LayerKind; 3] = [
        LayerKind::Foreground,
        LayerKind::Midground,
        LayerKind::Background,
    ];

    /// File name tag of the layer.
    pub fn code(self) -> &'static str {
        match self {
            LayerKind::Foreground => "fg",
            LayerKind::Midground => "mg",
            LayerKind::Background => "bg",
        }
    }

    /// Parallax index, 0 being the front.
    pub fn index(self) -> usize {
        match self {
            LayerKind::Foreground => 0,
            LayerKind::Midground => 1,
            LayerKind::Background => 2,
        }
    }

    pub fn max_variants(self) -> u32 {
        match self {
            LayerKind::Foreground | LayerKind::Midground => 3,
            LayerKind::Background => 10,
        }
    }
}

/// Directory of `environment`, or `None` if it is unknown.
pub fn environment_dir(environment: &str) -> Option<&'static str> {
    ENVIRONMENTS
        .iter()
        .find(|(name, _)| *name == environment)
        .map(|(_, dir)| *dir)
}

/// Resolve an environment name, falling back to the jungle.
pub fn resolve_environment(environment: &str) -> &'static str {
    match ENVIRONMENTS.iter().find(|(name, _)| *name == environment) {
        Some((name, _)) => *name,
        None => {
            warn!(
                "Unknown environment '{}', using '{}'",
                environment, DEFAULT_ENVIRONMENT
            );
            DEFAULT_ENVIRONMENT
        }
    }
}

/// Candidate files `v1..=max_variants` for one layer.
pub fn variant_paths(root: &Path, environment: &str, layer: LayerKind) -> Vec<PathBuf> {
    let environment = resolve_environment(environment);
    let dir = root
        .join(VARIANT_BASE_DIR)
        .join(CONTINENT_DIR)
        .join(environment_dir(environment).unwrap_or(ENVIRONMENTS[0].1));
    (1..=layer.max_variants())
        .map(|i| dir.join(format!("{}_{}_v{}.png", environment, layer.code(), i)))
        .collect()
}

/// Candidates that exist on disk.
pub fn discover_variants(root: &Path, environment: &str, layer: LayerKind) -> Vec<PathBuf> {
    let found: Vec<PathBuf> = variant_paths(root, environment, layer)
        .into_iter()
        .filter(|p| p.is_file())
        .collect();
    debug!(
        "Found {} '{}' variants for {}",
        found.len(),
        layer.code(),
        environment
    );
    found
}

/// Pick one of `variants`.
pub fn select_variant<'a>(variants: &'a [PathBuf], rng: &mut fastrand::Rng) -> Option<&'a PathBuf> {
    if variants.is_empty() {
        return None;
    }
    variants.get(rng.usize(..variants.len()))
}

/// Texture id under which a layer of `environment` is registered.
pub fn layer_texture_id(environment: &str, layer: LayerKind) -> String {
    format!("{}_{}", environment, layer.code())
}

/// Variant chosen for each layer of the active environment.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct BackgroundSelection {
    pub environment: &'static str,
    /// Indexed by [`LayerKind::index`]; `None` when no file exists.
    pub layers: [Option<PathBuf>; 3],
}

impl BackgroundSelection {
    pub fn choose(root: &Path, environment: &str, rng: &mut fastrand::Rng) -> Self {
        let environment = resolve_environment(environment);
        let mut layers: [Option<PathBuf>; 3] = Default::default();
        for layer in LayerKind::ALL {
            let variants = discover_variants(root, environment, layer);
            layers[layer.index()] = select_variant(&variants, rng).cloned();
        }
        Self {
            environment,
            layers,
        }
    }

    pub fn texture_id(&self, layer: LayerKind) -> String {
        layer_texture_id(self.environment, layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_paths_layout() {
        let paths = variant_paths(Path::new("assets"), "lake", LayerKind::Foreground);
        assert_eq!(paths.len(), 3);
        assert_eq!(
            paths[0],
            PathBuf::from("assets/backgrounds/environmentsnew/01_file_island/02_lake/lake_fg_v1.png")
        );
        assert_eq!(
            variant_paths(Path::new("assets"), "lake", LayerKind::Background).len(),
            10
        );
    }

    #[test]
    fn test_unknown_environment_falls_back() {
        let paths = variant_paths(Path::new("a"), "moon", LayerKind::Midground);
        assert!(paths[0].ends_with("01_tropicaljungle/tropicaljungle_mg_v1.png"));
    }

    #[test]
    fn test_discover_keeps_existing_files() {
        let root = std::env::temp_dir().join(format!("digivice_bg_{}", std::process::id()));
        let dir = root.join("backgrounds/environmentsnew/01_file_island/05_toytown");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("toytown_bg_v2.png"), b"x").unwrap();
        std::fs::write(dir.join("toytown_bg_v7.png"), b"x").unwrap();

        let found = discover_variants(&root, "toytown", LayerKind::Background);
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("toytown_bg_v2.png"));

        let mut rng = fastrand::Rng::with_seed(3);
        let pick = select_variant(&found, &mut rng).unwrap();
        assert!(found.contains(pick));

        let selection = BackgroundSelection::choose(&root, "toytown", &mut rng);
        assert!(selection.layers[LayerKind::Background.index()].is_some());
        assert!(selection.layers[LayerKind::Foreground.index()].is_none());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_select_from_nothing() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(select_variant(&[], &mut rng).is_none());
    }
}
