use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

pub const DEFAULT_EXPORT_FILE: &str = "rt-export.html";

pub const HELP_TEXT: &str = "\
Tab / Shift-Tab   Move focus: search, category, type, status, reset
<typing>          Edit the search text (search focused)
Left / Right      Change the selected option (select focused)
Enter             Activate reset (reset focused)
Ctrl-r            Reset all filters
Up / Down         Move the row cursor
PgUp / PgDown     Move the row cursor by a page
Ctrl-y            Copy selected row as csv
Ctrl-e            Export current view as html
F1                Show this help
Esc               Close help
q / Ctrl-c        Quit";

#[derive(Debug)]
pub enum TableError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    MissingColumn(String),
    InvalidDate { id: i64, value: String },
    DuplicateId(i64),
    InvalidId { row: usize, value: String },
    MissingValue { row: usize, column: String },
    InvalidOption { control: &'static str, value: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::IoError(e) => write!(f, "io error: {e}"),
            TableError::PolarsError(e) => write!(f, "could not read data: {e}"),
            TableError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            TableError::FileNotFound => write!(f, "file not found"),
            TableError::PermissionDenied => write!(f, "permission denied"),
            TableError::UnknownFileType => write!(f, "unknown file type"),
            TableError::MissingColumn(name) => write!(f, "missing column \"{name}\""),
            TableError::InvalidDate { id, value } => {
                write!(f, "record {id}: \"{value}\" is not a YYYY-MM-DD date")
            }
            TableError::DuplicateId(id) => write!(f, "duplicate record id {id}"),
            TableError::InvalidId { row, value } => {
                write!(f, "row {row}: \"{value}\" is not an integer id")
            }
            TableError::MissingValue { row, column } => write!(f, "row {row} has no {column}"),
            TableError::InvalidOption { control, value } => {
                write!(f, "\"{value}\" is not a valid {control}")
            }
        }
    }
}

impl std::error::Error for TableError {}

impl From<Error> for TableError {
    fn from(err: Error) -> Self {
        TableError::IoError(err)
    }
}

impl From<PolarsError> for TableError {
    fn from(err: PolarsError) -> Self {
        TableError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    pub event_poll_time: u64,
    #[setters(strip_option)]
    pub data_file: Option<PathBuf>,
    pub export_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            data_file: None,
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            log_file: std::env::temp_dir().join("rt.log"),
        }
    }
}

/// The interactive controls of the filter bar, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Search,
    Category,
    Type,
    Status,
    Reset,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Search,
        Control::Category,
        Control::Type,
        Control::Status,
        Control::Reset,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    FocusNext,
    FocusPrevious,
    NextOption,
    PreviousOption,
    Activate,
    Reset,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    CopyRow,
    ExportHtml,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
