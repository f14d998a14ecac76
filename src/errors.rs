use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridTapError {
    #[error("Hierarchy parse error: {0}")]
    Parse(String),

    #[error("Invalid cell label: {0}")]
    InvalidCellLabel(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Grid configuration error: {0}")]
    GridConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Element with index {index} not found; call get_screen_elements first")]
    ElementNotFound { index: usize },

    #[error("Device error: {0}")]
    Device(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl serde::Serialize for GridTapError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type GridTapResult<T> = Result<T, GridTapError>;
