use std::path::PathBuf;

pub const DEFAULT_DELIMITER: u8 = b';';

pub const DEFAULT_PRODUCTS_INPUT: &str = "data/dummy-products.csv";
pub const DEFAULT_PRODUCTS_OUTPUT: &str = "data/dummy-products.json";
pub const DEFAULT_ENTRIES_INPUT: &str = "data/dummy-priceBookEntires.csv";
pub const DEFAULT_ENTRIES_OUTPUT: &str = "data/dummy-pricebookentries.json";

/// How decimal cells that fail to parse are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Unparseable numbers become `0.0`.
    #[default]
    Lenient,
    /// Unparseable numbers abort the run.
    Strict,
}

/// Everything one pipeline run needs, passed in explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub delimiter: u8,
    pub numeric_mode: NumericMode,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            delimiter: DEFAULT_DELIMITER,
            numeric_mode: NumericMode::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_numeric_mode(mut self, numeric_mode: NumericMode) -> Self {
        self.numeric_mode = numeric_mode;
        self
    }
}

/// Which record batch a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineKind {
    Products,
    PricebookEntries { pricebook_id: String },
}

/// Parses a delimiter argument. Only a single ASCII character is accepted,
/// with `\t` and `tab` as spellings of the tab character.
pub fn parse_delimiter(arg: &str) -> Result<u8, String> {
    if arg == "\\t" || arg == "tab" {
        return Ok(b'\t');
    }

    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got {arg:?}"
        )),
    }
}
