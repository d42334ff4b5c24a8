// Shell configuration, loaded from the JSON document packaged with the app.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::surface::CacheMode;

pub const DEFAULT_ROOT_DOCUMENT: &str = "index.html";
pub const DEFAULT_LOG_TAG: &str = "SuperleitorApp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    pub app_id: String,
    pub app_name: String,
    /// Directory of the packaged web bundle, relative to the project root.
    pub web_dir: String,
    /// Entry document inside the bundle. Resolved once at packaging time.
    pub root_document: String,
    pub log_tag: String,
    pub android: AndroidConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AndroidConfig {
    pub allow_mixed_content: bool,
    pub web_contents_debugging_enabled: bool,
    pub allow_universal_access_from_file_urls: bool,
    pub cache_mode: CacheMode,
    /// `#RRGGBB` or `#AARRGGBB`.
    pub background_color: Option<String>,
    pub intercept_local_assets: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_id: "com.superleitor.app".to_string(),
            app_name: "Superleitor".to_string(),
            web_dir: "dist".to_string(),
            root_document: DEFAULT_ROOT_DOCUMENT.to_string(),
            log_tag: DEFAULT_LOG_TAG.to_string(),
            android: AndroidConfig::default(),
        }
    }
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            allow_mixed_content: false,
            web_contents_debugging_enabled: false,
            allow_universal_access_from_file_urls: false,
            cache_mode: CacheMode::Default,
            background_color: None,
            intercept_local_assets: true,
        }
    }
}

impl ShellConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid shell config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let root = self.root_document.trim_start_matches('/');
        if root.is_empty() {
            bail!("rootDocument must not be empty");
        }
        if root.split('/').any(|segment| segment == "..") {
            bail!("rootDocument must stay inside the bundle: {}", self.root_document);
        }
        Ok(())
    }

    /// Root document path relative to the asset root, without a leading slash.
    pub fn root_document_path(&self) -> &str {
        self.root_document.trim_start_matches('/')
    }

    /// Parsed background color as ARGB, if one is configured.
    pub fn background_color(&self) -> Result<Option<u32>> {
        self.android
            .background_color
            .as_deref()
            .map(parse_color)
            .transpose()
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB` into an ARGB value.
pub fn parse_color(s: &str) -> Result<u32> {
    let hex = s
        .strip_prefix('#')
        .with_context(|| format!("Color must start with '#': {}", s))?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color value: {}", s);
    }
    let value =
        u32::from_str_radix(hex, 16).with_context(|| format!("Invalid color value: {}", s))?;
    match hex.len() {
        6 => Ok(0xFF00_0000 | value),
        8 => Ok(value),
        _ => bail!("Color must be #RRGGBB or #AARRGGBB: {}", s),
    }
}
