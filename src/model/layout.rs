//! Offsets of a frozen dataset
use super::{Dataset, NetCDFAttribute, NetCDFVariable, NetCDFVersion};
use crate::constants_and_types as csts;
use crate::error::{Error, Result};
use crate::utils::{padded, padding};
use log::{debug, trace, warn};

/// Placement of one variable in the data section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VarLayout {
    /// `vsize` header field, clamped to `0xFFFFFFFF` for oversized variables
    pub vsize: u32,
    /// Elements of the whole variable (fixed) or of one record
    pub chunk_len: u64,
    /// Padded number of bytes of the whole variable (fixed) or of one record
    pub chunk_size: u64,
    /// Absolute offset of the data (of record 0 for record variables)
    pub begin: u64,
}

/// Offsets of every variable plus header and record sizes
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Layout {
    pub header_size: u64,
    pub record_size: u64,
    /// One entry per variable, in declaration order
    pub vars: Vec<VarLayout>,
}

impl Layout {
    /// Freeze the offsets of `dataset`.
    ///
    /// Fixed variables come right after the header in declaration order,
    /// record variables follow, also in declaration order. The header
    /// occupies at least `header_min_size` bytes.
    pub fn compute(dataset: &Dataset, header_min_size: u64) -> Result<Layout> {
        dataset.validate()?;
        let header_size = padded(header_len(dataset).max(header_min_size));

        let too_large = |var: &NetCDFVariable| Error::VariableTooLarge(var.name().to_string());
        let mut chunks: Vec<(u64, u64)> = Vec::with_capacity(dataset.vars().len());
        for var in dataset.vars() {
            match (dataset.chunk_len(var), dataset.chunk_size(var)) {
                (Some(len), Some(size)) => chunks.push((len, size)),
                _ => return Err(too_large(var)),
            }
        }
        let mut begins: Vec<u64> = vec![0; chunks.len()];
        let mut cursor = header_size;
        let mut record_size: u64 = 0;
        for record in [false, true].iter() {
            for (i, var) in dataset.vars().iter().enumerate() {
                if dataset.is_record_var(var) != *record {
                    continue;
                }
                begins[i] = cursor;
                let (_, size) = chunks[i];
                cursor = cursor.checked_add(size).ok_or_else(|| too_large(var))?;
                if *record {
                    record_size = record_size.checked_add(size).ok_or_else(|| too_large(var))?;
                }
            }
        }

        let mut vars = Vec::with_capacity(chunks.len());
        for ((var, (chunk_len, chunk_size)), begin) in
            dataset.vars().iter().zip(chunks).zip(begins)
        {
            if dataset.version() == NetCDFVersion::Classic && begin > csts::CLASSIC_MAX_OFFSET {
                return Err(Error::OffsetOverflow {
                    var: var.name().to_string(),
                    begin,
                });
            }
            trace!("variable `{}` begins at {} ({} bytes)", var.name(), begin, chunk_size);
            vars.push(VarLayout {
                vsize: vsize_field(var.name(), chunk_size),
                chunk_len,
                chunk_size,
                begin,
            });
        }
        debug!(
            "layout frozen: {} variables, header {} bytes, record size {}",
            vars.len(),
            header_size,
            record_size
        );
        Ok(Layout {
            header_size,
            record_size,
            vars,
        })
    }

    /// Offset of the first record, `None` without record variables
    pub fn records_begin(&self, dataset: &Dataset) -> Option<u64> {
        dataset
            .vars()
            .iter()
            .zip(self.vars.iter())
            .filter(|(v, _)| dataset.is_record_var(v))
            .map(|(_, l)| l.begin)
            .min()
    }

    /// End of the fixed-size data, where records start
    pub fn fixed_end(&self, dataset: &Dataset) -> u64 {
        dataset
            .vars()
            .iter()
            .zip(self.vars.iter())
            .filter(|(v, _)| !dataset.is_record_var(v))
            .map(|(_, l)| l.begin.saturating_add(l.chunk_size))
            .max()
            .unwrap_or(self.header_size)
    }
}

fn vsize_field(name: &str, chunk_size: u64) -> u32 {
    if chunk_size > csts::MAX_VSIZE {
        warn!("variable `{}` is too large for vsize, writing 0xFFFFFFFF", name);
        u32::MAX
    } else {
        chunk_size as u32
    }
}

fn name_len(name: &str) -> u64 {
    (4 + name.len() + padding(name.len())) as u64
}

fn attrs_len(attrs: &[NetCDFAttribute]) -> u64 {
    // tag and count, or the eight zero bytes of an absent list
    let mut n = 8;
    for attr in attrs {
        let values = attr.data().byte_len();
        n += name_len(attr.name()) + 4 + 4 + (values + padding(values)) as u64;
    }
    n
}

/// Number of bytes of the encoded header of `dataset`, before any reserved
/// space
pub fn header_len(dataset: &Dataset) -> u64 {
    // magic, version byte and numrecs
    let mut n: u64 = 4 + 4;
    n += 8;
    for dim in dataset.dims() {
        n += name_len(dim.name()) + 4;
    }
    n += attrs_len(dataset.attrs());
    n += 8;
    for var in dataset.vars() {
        n += name_len(var.name());
        n += 4 + 4 * var.dims().len() as u64;
        n += attrs_len(var.attributes());
        // nc_type, vsize and begin
        n += 4 + 4 + dataset.version().offset_size() as u64;
    }
    n
}
