//! ODS writer options

use std::path::PathBuf;

use dirsheet_core::DEFAULT_COLUMN_WIDTH;

/// Name of the content entry inside an ODS archive
pub const CONTENT_ENTRY: &str = "content.xml";

/// Which archive backend folds the content back into the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process rewrite with the `zip` crate
    #[default]
    Native,
    /// External `unzip`/`zip` programs against a scratch directory
    Command,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(BackendKind::Native),
            "command" | "cli" => Ok(BackendKind::Command),
            other => Err(format!("unknown archive backend: {}", other)),
        }
    }
}

/// Options for rendering sheets, rows and cells
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Width assumed for columns without an explicit width
    pub default_column_width: String,
    /// Alternate data row styles (ignored in flat mode)
    pub alternate_rows: bool,
    /// Header cell background
    pub header_background: String,
    /// Background of even data rows
    pub even_background: String,
    /// Background of odd data rows
    pub odd_background: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_column_width: DEFAULT_COLUMN_WIDTH.to_string(),
            alternate_rows: true,
            header_background: "#cccccc".to_string(),
            even_background: "#ffffff".to_string(),
            odd_background: "#e6e6e6".to_string(),
        }
    }
}

/// Options for the external archive programs
#[derive(Debug, Clone)]
pub struct CommandOptions {
    /// `zip` program
    pub zip_program: PathBuf,
    /// `unzip` program
    pub unzip_program: PathBuf,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            zip_program: PathBuf::from("zip"),
            unzip_program: PathBuf::from("unzip"),
        }
    }
}

/// Options for one templated ODS generation run
#[derive(Debug, Clone)]
pub struct OdsOptions {
    /// Template archive (copied, never modified)
    pub template: PathBuf,
    /// Destination archive
    pub destination: PathBuf,
    /// Archive backend
    pub backend: BackendKind,
    /// Name of the content entry
    pub content_entry: String,
    /// Parent directory for scratch directories (None = system temp dir)
    pub scratch_parent: Option<PathBuf>,
    /// Keep the scratch directory after closing, for inspection
    pub retain_scratch: bool,
    /// Renderer options
    pub render: RenderOptions,
    /// External program options (command backend only)
    pub commands: CommandOptions,
}

impl OdsOptions {
    /// Create options for a template and destination
    pub fn new(template: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            destination: destination.into(),
            backend: BackendKind::default(),
            content_entry: CONTENT_ENTRY.to_string(),
            scratch_parent: None,
            retain_scratch: false,
            render: RenderOptions::default(),
            commands: CommandOptions::default(),
        }
    }

    /// Set the archive backend
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the scratch parent directory
    pub fn with_scratch_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    /// Keep the scratch directory for inspection
    pub fn with_retain_scratch(mut self, retain: bool) -> Self {
        self.retain_scratch = retain;
        self
    }

    /// Enable or disable alternating data rows
    pub fn with_alternate_rows(mut self, alternate: bool) -> Self {
        self.render.alternate_rows = alternate;
        self
    }

    /// Set the default column width
    pub fn with_default_column_width(mut self, width: impl Into<String>) -> Self {
        self.render.default_column_width = width.into();
        self
    }
}
