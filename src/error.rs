//! Error types of the NetCDF classic reader and writer
//!
//! Header parsing runs on nom, so parser faults are raised as [`ParseFault`]s
//! carrying the remaining input. [`Error::from_nom`] turns them into crate
//! errors holding the byte offset of the fault.
//!
//! - [Official nom documentation about error management](https://github.com/Geal/nom/blob/master/doc/error_management.md)
//! - [Official nom example about custom error](https://github.com/Geal/nom/blob/master/examples/custom_error.rs)
use crate::model::NetCDFType;
use nom::error::ErrorKind as NomErrorKind;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong at a given position of a header
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultKind {
    /// The input does not start with `CDF`
    #[error("missing `CDF` magic bytes")]
    NotANetcdfFile,
    /// Version byte is neither 1 nor 2
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    /// A length or count stored as a negative 32-bit integer
    #[error("negative length {0}")]
    InvalidLength(i32),
    /// Padding to the next 4-byte boundary must be zero
    #[error("non-zero padding byte")]
    NonZeroPadding,
    /// Expected zero, got something else
    #[error("expected zero, got {0:#x}")]
    NonZeroValue(u32),
    /// Type of list is unknown
    #[error("unsupported list type {0:#x}")]
    UnsupportedListType(u32),
    /// List tag does not match the section being parsed
    #[error("unexpected list tag {found:#x}, expected {expected:#x}")]
    UnexpectedListTag { found: u32, expected: u32 },
    /// Parsing UTF-8 error
    #[error("name is not valid UTF-8")]
    UTF8error,
    /// Names must not be empty
    #[error("empty name")]
    EmptyName,
    /// Unknown NetCDF data type
    #[error("unknown nc_type {0}")]
    UnknownNetCDFType(u32),
    /// Name defined twice in the same list
    #[error("duplicate name `{0}`")]
    DuplicateName(String),
    /// Second dimension with size 0
    #[error("more than one unlimited dimension")]
    MultipleUnlimitedDimensions,
    /// Variable refers to a dimension id that was never defined
    #[error("dimension index {index} out of range for {count} dimensions")]
    DimensionIndexOutOfRange { index: u32, count: usize },
    /// Unlimited dimension used past the first position of a variable
    #[error("variable `{var}` uses the unlimited dimension at position {position}")]
    UnlimitedNotOutermost { var: String, position: usize },
    /// Byte size of a variable does not fit in 64 bits
    #[error("variable `{0}` is too large to be addressed")]
    VariableTooLarge(String),
    /// Error caused by parsing library
    #[error("parser error: {0:?}")]
    Nom(NomErrorKind),
}

/// nom error type used by the header parsers
#[derive(Debug, PartialEq)]
pub struct ParseFault<I> {
    pub input: I,
    pub kind: FaultKind,
}

impl<I> ParseFault<I> {
    pub fn new(input: I, kind: FaultKind) -> Self {
        ParseFault { input, kind }
    }
}

impl<I> nom::error::ParseError<I> for ParseFault<I> {
    fn from_error_kind(input: I, kind: NomErrorKind) -> Self {
        ParseFault::new(input, FaultKind::Nom(kind))
    }
    fn append(_: I, _: NomErrorKind, other: Self) -> Self {
        other
    }
}

/// Namespaces in which names must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Dimension,
    Variable,
    Attribute,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Dimension => f.write_str("dimension"),
            Namespace::Variable => f.write_str("variable"),
            Namespace::Attribute => f.write_str("attribute"),
        }
    }
}

/// Coarse classification of [`Error`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad magic bytes or version
    Format,
    /// Names, dimensions and offsets that do not fit together
    Structural,
    /// Input shorter than the header declares
    Truncation,
    /// Invalid lengths, padding, type codes or strings
    Encoding,
    /// Caller supplied data that does not match a declaration
    Data,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid header at byte {offset}: {kind}")]
    Header { offset: usize, kind: FaultKind },
    #[error("input truncated at byte {offset}")]
    TruncatedInput { offset: usize, needed: Option<usize> },

    #[error("invalid name {0:?}")]
    InvalidName(String),
    #[error("{namespace} `{name}` is already defined")]
    DuplicateName { namespace: Namespace, name: String },
    #[error("dimension `{name}` has invalid size {size}")]
    InvalidDimensionSize { name: String, size: u32 },
    #[error("unlimited dimension `{second}` conflicts with `{first}`")]
    MultipleUnlimitedDimensions { first: String, second: String },
    #[error("variable `{var}` refers to undefined dimension `{dim}`")]
    UnknownDimension { var: String, dim: String },
    #[error("variable `{var}` uses dimension index {index}, only {count} defined")]
    DimensionIndexOutOfRange { var: String, index: u32, count: usize },
    #[error("variable `{var}` uses the unlimited dimension `{dim}` past its first position")]
    UnlimitedNotOutermost { var: String, dim: String },
    #[error("{records} records supplied but the dataset has no unlimited dimension")]
    EmptyDatasetConflict { records: u64 },
    #[error("variable `{var}` would begin at byte {begin}, past the classic format limit")]
    OffsetOverflow { var: String, begin: u64 },
    #[error("variable `{0}` is too large to be addressed")]
    VariableTooLarge(String),
    #[error("undefined dimension `{0}`")]
    UndefinedDimension(String),
    #[error("dimension `{dim}` is still used by {vars:?}")]
    DimensionInUse { dim: String, vars: Vec<String> },

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    #[error("variable `{var}` holds {expected:?} elements, got {got:?}")]
    TypeMismatch {
        var: String,
        expected: NetCDFType,
        got: NetCDFType,
    },
    #[error("variable `{var}` expects {expected} elements, got {got}")]
    ShapeMismatch { var: String, expected: u64, got: u64 },
    #[error("variable `{var}` supplies {got} records, expected {expected}")]
    RecordCountMismatch { var: String, expected: u64, got: u64 },
    #[error("record {index} of `{var}` is out of range ({numrecs} records)")]
    RecordIndexOutOfRange { var: String, index: u64, numrecs: u64 },
    #[error("`{0}` is not a record variable")]
    NotARecordVariable(String),
    #[error("`{0}` is not a scalar variable")]
    NotScalar(String),
    #[error("index {index:?} is out of bounds for `{var}`")]
    IndexOutOfBounds { var: String, index: Vec<usize> },
    #[error("{remaining} record bytes are not a multiple of the record size {record_size}")]
    StreamingRecordCount { remaining: u64, record_size: u64 },
    #[error("data of `{var}` ends at byte {end}, past the end of the input ({len} bytes)")]
    DataOutOfBounds { var: String, end: u64, len: u64 },

    #[error("unknown fixture `{0}`")]
    UnknownFixture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert a nom error raised while parsing `original` into an [`Error`]
    /// positioned relative to the start of `original`.
    pub fn from_nom(original: &[u8], err: nom::Err<ParseFault<&[u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => Error::TruncatedInput {
                offset: original.len(),
                needed: match needed {
                    nom::Needed::Size(n) => Some(n.get()),
                    nom::Needed::Unknown => None,
                },
            },
            nom::Err::Error(fault) | nom::Err::Failure(fault) => Error::Header {
                offset: original.len() - fault.input.len(),
                kind: fault.kind,
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Header { kind, .. } => match kind {
                FaultKind::NotANetcdfFile | FaultKind::UnsupportedVersion(_) => {
                    ErrorCategory::Format
                }
                FaultKind::DuplicateName(_)
                | FaultKind::MultipleUnlimitedDimensions
                | FaultKind::DimensionIndexOutOfRange { .. }
                | FaultKind::UnlimitedNotOutermost { .. }
                | FaultKind::VariableTooLarge(_) => ErrorCategory::Structural,
                FaultKind::InvalidLength(_)
                | FaultKind::NonZeroPadding
                | FaultKind::NonZeroValue(_)
                | FaultKind::UnsupportedListType(_)
                | FaultKind::UnexpectedListTag { .. }
                | FaultKind::UTF8error
                | FaultKind::EmptyName
                | FaultKind::UnknownNetCDFType(_)
                | FaultKind::Nom(_) => ErrorCategory::Encoding,
            },
            Error::TruncatedInput { .. } | Error::DataOutOfBounds { .. } => {
                ErrorCategory::Truncation
            }
            Error::InvalidName(_) => ErrorCategory::Encoding,
            Error::DuplicateName { .. }
            | Error::InvalidDimensionSize { .. }
            | Error::MultipleUnlimitedDimensions { .. }
            | Error::UnknownDimension { .. }
            | Error::DimensionIndexOutOfRange { .. }
            | Error::UnlimitedNotOutermost { .. }
            | Error::EmptyDatasetConflict { .. }
            | Error::OffsetOverflow { .. }
            | Error::VariableTooLarge(_)
            | Error::DimensionInUse { .. }
            | Error::StreamingRecordCount { .. } => ErrorCategory::Structural,
            Error::UnknownVariable(_)
            | Error::UnknownAttribute(_)
            | Error::UndefinedDimension(_)
            | Error::TypeMismatch { .. }
            | Error::ShapeMismatch { .. }
            | Error::RecordCountMismatch { .. }
            | Error::RecordIndexOutOfRange { .. }
            | Error::NotARecordVariable(_)
            | Error::NotScalar(_)
            | Error::IndexOutOfBounds { .. }
            | Error::UnknownFixture(_) => ErrorCategory::Data,
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Byte offset of the fault, for errors raised while parsing a header
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Header { offset, .. } | Error::TruncatedInput { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// `true` if more input could turn this error into a successful parse
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::TruncatedInput { .. })
    }
}
