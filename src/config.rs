use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GridTapError, GridTapResult};
use crate::perception::extractor::ExtractOptions;
use crate::perception::grid::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::perception::overlay::OverlayStyle;
use crate::perception::types::FilterConfig;

pub const CONFIG_FILE_NAME: &str = "gridtap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    /// File this config was read from; relative paths resolve against its directory.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_cols")]
    pub cols: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default)]
    pub overlay: OverlayStyle,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            overlay: OverlayStyle::default(),
        }
    }
}

fn default_cols() -> u32 {
    DEFAULT_COLS
}

fn default_rows() -> u32 {
    DEFAULT_ROWS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default)]
    pub include_all: bool,
    /// JSON file in the `{ "filter": [...], "class_filter": [...] }` shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_file: Option<PathBuf>,
    /// Inline filters, merged with the file's.
    #[serde(flatten)]
    pub filters: FilterConfig,
}

impl AppConfig {
    /// Extraction options with the filter file (if any) merged in.
    pub fn extract_options(&self) -> GridTapResult<ExtractOptions> {
        let mut filters = self.extraction.filters.clone();
        if let Some(file) = &self.extraction.filter_file {
            let path = match (&self.source, file.is_relative()) {
                (Some(src), true) => src
                    .parent()
                    .map(|dir| dir.join(file))
                    .unwrap_or_else(|| file.clone()),
                _ => file.clone(),
            };
            filters = filters.merge(load_filters(&path)?);
        }
        Ok(ExtractOptions {
            filters,
            include_all: self.extraction.include_all,
        })
    }
}

/// Read a JSON filter file.
pub fn load_filters(path: &Path) -> GridTapResult<FilterConfig> {
    let content = std::fs::read_to_string(path)?;
    let filters: FilterConfig = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        text = filters.filter.len(),
        class = filters.class_filter.len(),
        "filters loaded"
    );
    Ok(filters)
}

fn resolve_config_path(explicit: Option<&Path>) -> GridTapResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(GridTapError::Config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(Some(candidate));
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(Some(candidate));
    }

    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join("gridtap").join(CONFIG_FILE_NAME);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in user config dir");
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

/// Load the config from `explicit`, or search the default locations. With no
/// file anywhere, every setting takes its default.
pub fn load_config(explicit: Option<&Path>) -> GridTapResult<AppConfig> {
    let Some(path) = resolve_config_path(explicit)? else {
        tracing::debug!("no config file found; using defaults");
        return Ok(AppConfig::default());
    };
    let mut config = read_config(&path)?;
    config.source = Some(path);
    Ok(config)
}

fn read_config(path: &Path) -> GridTapResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        cols = config.grid.cols,
        rows = config.grid.rows,
        "config loaded"
    );
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> GridTapResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.grid.cols, 20);
        assert_eq!(config.grid.rows, 40);
        assert_eq!(config.grid.overlay.label_every, 2);
        assert!(!config.extraction.include_all);
        assert!(config.extraction.filters.is_empty());
    }

    #[test]
    fn parses_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [grid]
            cols = 10
            rows = 20

            [grid.overlay]
            label_every = 1

            [extraction]
            include_all = true
            filter = ["Advertisement"]
            class_filter = ["android.view.View"]
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.cols, 10);
        assert_eq!(config.grid.overlay.label_every, 1);
        assert_eq!(config.grid.overlay.major_every, 5);
        let options = config.extract_options().unwrap();
        assert!(options.include_all);
        assert!(options.filters.filter.contains("Advertisement"));
        assert!(options.filters.class_filter.contains("android.view.View"));
    }

    #[test]
    fn filter_file_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("filter.json"),
            r#"{"filter": ["Sponsored"], "class_filter": []}"#,
        )
        .unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &config_path,
            "[extraction]\nfilter_file = \"filter.json\"\nfilter = [\"Ad\"]\n",
        )
        .unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        let options = config.extract_options().unwrap();
        assert!(options.filters.filter.contains("Sponsored"));
        assert!(options.filters.filter.contains("Ad"));
    }

    #[test]
    fn missing_explicit_path_is_config_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, GridTapError::Config(_)));
    }

    #[test]
    fn save_then_load_keeps_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = AppConfig::default();
        config.grid.cols = 12;
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().grid.cols, 12);
    }
}
