use std::fmt;

use crate::device::DataType;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by windows, contexts and charts.
///
/// None of these are retried internally; every variant terminates the
/// operation that raised it and is returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The native window, surface or GPU context could not be initialized.
    ContextCreation(String),

    /// A chart was asked to store data in a type outside the supported set.
    UnsupportedElementType(DataType),

    /// A cell-addressed draw referenced a cell outside the current grid.
    GridIndexOutOfRange {
        col: u32,
        row: u32,
        cols: u32,
        rows: u32,
    },

    /// A cell-addressed draw was issued before `Window::grid`.
    GridNotSet,

    /// `Window::grid` was called with zero rows or columns.
    InvalidGrid { rows: u32, cols: u32 },

    /// The GPU backend reported an error at a checked boundary.
    GraphicsBackend {
        code: u32,
        site: String,
        message: String,
    },

    /// A chart created under one GPU context was rendered into a window of another.
    ForeignContext,

    /// Bulk upload does not fit the chart's fixed-size buffer.
    DataSize { expected: u64, actual: u64 },

    /// Bulk upload element type differs from the type the chart was created with.
    DataTypeMismatch {
        expected: DataType,
        actual: DataType,
    },

    /// A buffer or binding handle is not (or no longer) known to the context.
    UnknownResource(&'static str),

    /// Font file could not be read or parsed.
    Font(String),
}

impl Error {
    pub(crate) fn context_creation(err: impl fmt::Display) -> Self {
        Self::ContextCreation(err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextCreation(msg) => write!(f, "context creation failed: {msg}"),
            Error::UnsupportedElementType(ty) => {
                write!(f, "unsupported element type {ty:?} for chart storage")
            }
            Error::GridIndexOutOfRange { col, row, cols, rows } => write!(
                f,
                "grid cell (col {col}, row {row}) outside {rows}x{cols} grid"
            ),
            Error::GridNotSet => write!(f, "cell draw issued before grid() was called"),
            Error::InvalidGrid { rows, cols } => {
                write!(f, "invalid grid {rows}x{cols}: rows and columns must be >= 1")
            }
            Error::GraphicsBackend { code, site, message } => {
                write!(f, "graphics backend error {code} at {site}: {message}")
            }
            Error::ForeignContext => {
                write!(f, "chart belongs to a different GPU context than the window")
            }
            Error::DataSize { expected, actual } => write!(
                f,
                "upload of {actual} bytes does not fit buffer of {expected} bytes"
            ),
            Error::DataTypeMismatch { expected, actual } => {
                write!(f, "upload of {actual:?} data into {expected:?} buffer")
            }
            Error::UnknownResource(kind) => write!(f, "unknown {kind} handle"),
            Error::Font(msg) => write!(f, "font load error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
