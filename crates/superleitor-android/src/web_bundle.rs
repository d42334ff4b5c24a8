// Web bundle and shell configuration compiled into the library.

use anyhow::Result;
use rust_embed::RustEmbed;
use std::sync::Arc;
use superleitor_shell::{AssetSource, EmbeddedAssets, ShellConfig};

/// Output of the web build. `build.rs` checks the root document is present.
#[derive(RustEmbed)]
#[folder = "../../dist/"]
pub struct WebBundle;

const SHELL_CONFIG: &str = include_str!("../shell.config.json");

/// Parse the packaged config. Debug builds always enable WebView inspection.
pub fn load_config() -> Result<ShellConfig> {
    let mut config = ShellConfig::from_json(SHELL_CONFIG)?;
    if cfg!(debug_assertions) {
        config.android.web_contents_debugging_enabled = true;
    }
    Ok(config)
}

pub fn assets() -> Arc<dyn AssetSource> {
    Arc::new(EmbeddedAssets::<WebBundle>::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaged_config_parses() {
        let config = load_config().unwrap();
        assert_eq!(config.app_id, "com.superleitor.app");
        assert_eq!(config.web_dir, "dist");
        assert!(!config.android.allow_universal_access_from_file_urls);
        assert_eq!(config.background_color().unwrap(), Some(0));
    }

    #[test]
    fn bundle_contains_root_document() {
        let config = load_config().unwrap();
        assert!(assets().contains(config.root_document_path()));
    }

    #[test]
    fn debug_builds_enable_inspection() {
        let config = load_config().unwrap();
        assert_eq!(
            config.android.web_contents_debugging_enabled,
            cfg!(debug_assertions)
        );
    }
}
