//! Main parsing module
//!
//! # Parser
//! Streaming nom parsers for the header of a NetCDF classic or 64-bit offset
//! file:
//!
//! ```text
//! header  = magic numrecs dim_list gatt_list var_list
//! magic   = 'C' 'D' 'F' VERSION_BYTE
//! ```
//!
//! [`header`] stops right after the variable list. Data is never touched
//! here.
use crate::constants_and_types as csts;
use crate::error::{Error, FaultKind, Result};
use crate::model::{NetCDFAttribute, NetCDFDimension, NetCDFVersion};
use components::{attribute_list, dimension_list, fault, variable_list, word, NcResult};
use log::trace;
use nom::{bytes::streaming::tag, number::streaming::u8};

pub mod components;

pub use components::{ListType, ParsedVariable};

/// Length of record dimension
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NumberOfRecords {
    NonNegative(csts::NON_NEG),
    Streaming,
}

/// Parse length of record dimension [atomic]
pub fn number_of_records(i: &[u8]) -> NcResult<&[u8], NumberOfRecords> {
    // netCDF3 uses big endian
    let (i, o) = word(i)?;
    match o {
        csts::STREAMING => Ok((i, NumberOfRecords::Streaming)),
        _ => Ok((i, NumberOfRecords::NonNegative(o))),
    }
}

/// Parse a single byte [atomic]
fn take_u8(i: &[u8]) -> NcResult<&[u8], u8> {
    u8(i)
}

/// Parse NetCDF initials [atomic]
pub fn initials(i: &[u8]) -> NcResult<&[u8], &[u8]> {
    match tag(&csts::MAGIC[..])(i) {
        Err(nom::Err::Error(_)) => fault(i, FaultKind::NotANetcdfFile),
        result => result,
    }
}

/// Parse NetCDF version [atomic]
pub fn nc_version(i: &[u8]) -> NcResult<&[u8], NetCDFVersion> {
    let (rest, o) = take_u8(i)?;
    match o {
        1 => Ok((rest, NetCDFVersion::Classic)),
        2 => Ok((rest, NetCDFVersion::Offset64)),
        _ => fault(i, FaultKind::UnsupportedVersion(o)),
    }
}

/// Parse NetCDF magic bytes [combined]
pub fn magic(i: &[u8]) -> NcResult<&[u8], NetCDFVersion> {
    let (i, _) = initials(i)?;
    let (i, v) = nc_version(i)?;
    Ok((i, v))
}

/// Header as stored on disk, before the record count is resolved
#[derive(Debug, PartialEq, Clone)]
pub struct RawHeader {
    pub version: NetCDFVersion,
    pub numrecs: NumberOfRecords,
    pub dims: Vec<NetCDFDimension>,
    pub attrs: Vec<NetCDFAttribute>,
    pub vars: Vec<ParsedVariable>,
}

/// Parse a whole header [combined]
pub fn header(i: &[u8]) -> NcResult<&[u8], RawHeader> {
    let (i, version) = magic(i)?;
    let (i, numrecs) = number_of_records(i)?;
    let (i, dims) = dimension_list(i)?;
    let (i, attrs) = attribute_list(i)?;
    let (i, vars) = variable_list(i, version, &dims)?;
    Ok((
        i,
        RawHeader {
            version,
            numrecs,
            dims,
            attrs,
            vars,
        },
    ))
}

/// Parse the header at the start of `input`, returning it with its length
/// in bytes
pub fn parse_header(input: &[u8]) -> Result<(RawHeader, usize)> {
    match header(input) {
        Ok((rest, raw)) => {
            let consumed = input.len() - rest.len();
            trace!(
                "parsed header: {} bytes, {} dimensions, {} variables",
                consumed,
                raw.dims.len(),
                raw.vars.len()
            );
            Ok((raw, consumed))
        }
        Err(e) => Err(Error::from_nom(input, e)),
    }
}
