use super::{Dataset, Layout, NetCDFDimension, NetCDFType, NetCDFVariable, VarLayout};
use crate::error::{Error, Result};
use crate::utils::product_vector;
use std::ops::Range;

/// A dataset together with its frozen offsets and the number of records
#[derive(Debug, PartialEq, Clone)]
pub struct NetCDFHeader {
    pub dataset: Dataset,
    pub numrecs: u64,
    pub layout: Layout,
}

/// Where the bytes of one variable are found.
///
/// Fixed variables are a single chunk. Record variables have one chunk per
/// record, `stride` (the record size) bytes apart.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VariableRegion {
    pub nc_type: NetCDFType,
    pub begin: u64,
    /// Elements per chunk
    pub chunk_len: u64,
    pub num_chunks: u64,
    pub stride: u64,
}

impl VariableRegion {
    /// Useful bytes of a chunk, padding excluded
    pub fn chunk_bytes(&self) -> u64 {
        self.chunk_len * self.nc_type.extsize() as u64
    }

    pub fn chunk_range(&self, index: u64) -> Option<Range<u64>> {
        if index >= self.num_chunks {
            return None;
        }
        let start = self.begin + index * self.stride;
        Some(start..start + self.chunk_bytes())
    }

    /// Number of elements, saturating at `u64::MAX`
    pub fn len(&self) -> u64 {
        self.chunk_len.saturating_mul(self.num_chunks)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First byte past the last useful byte, `None` past `u64::MAX`
    pub fn end(&self) -> Option<u64> {
        match self.num_chunks {
            0 => Some(self.begin),
            n => (n - 1)
                .checked_mul(self.stride)
                .and_then(|skip| skip.checked_add(self.chunk_bytes()))
                .and_then(|len| len.checked_add(self.begin)),
        }
    }
}

impl NetCDFHeader {
    pub fn var(&self, name: &str) -> Option<(&NetCDFVariable, &VarLayout)> {
        let index = self.dataset.var_index(name)?;
        Some((&self.dataset.vars()[index], &self.layout.vars[index]))
    }

    fn lookup(&self, name: &str) -> Result<(&NetCDFVariable, &VarLayout)> {
        self.var(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Length of a dimension, the unlimited one being `numrecs` long
    pub fn dim_length(&self, dim: &NetCDFDimension) -> u64 {
        dim.size().map_or(self.numrecs, u64::from)
    }

    pub fn shape(&self, name: &str) -> Result<Vec<u64>> {
        let (var, _) = self.lookup(name)?;
        Ok(self.dataset.shape(var, self.numrecs))
    }

    pub fn is_record_var(&self, name: &str) -> Result<bool> {
        let (var, _) = self.lookup(name)?;
        Ok(self.dataset.is_record_var(var))
    }

    pub fn region(&self, name: &str) -> Result<VariableRegion> {
        let (var, layout) = self.lookup(name)?;
        let record = self.dataset.is_record_var(var);
        Ok(VariableRegion {
            nc_type: var.nc_type(),
            begin: layout.begin,
            chunk_len: layout.chunk_len,
            num_chunks: if record { self.numrecs } else { 1 },
            stride: if record { self.layout.record_size } else { 0 },
        })
    }

    /// Absolute byte offset of the element at `index` (one entry per
    /// dimension, outermost first)
    pub fn element_offset(&self, name: &str, index: &[usize]) -> Result<u64> {
        let (var, layout) = self.lookup(name)?;
        let shape = self.dataset.shape(var, self.numrecs);
        let out_of_bounds = || Error::IndexOutOfBounds {
            var: name.to_string(),
            index: index.to_vec(),
        };
        if index.len() != shape.len()
            || index.iter().zip(shape.iter()).any(|(i, n)| *i as u64 >= *n)
        {
            return Err(out_of_bounds());
        }
        let (record, inner, inner_shape) = if self.dataset.is_record_var(var) {
            (index[0] as u64, &index[1..], &shape[1..])
        } else {
            (0, index, &shape[..])
        };
        let element: u64 = product_vector(inner_shape)
            .iter()
            .zip(inner.iter())
            .map(|(stride, i)| stride * *i as u64)
            .sum();
        record
            .checked_mul(self.layout.record_size)
            .and_then(|skip| skip.checked_add(element * var.nc_type().extsize() as u64))
            .and_then(|offset| offset.checked_add(layout.begin))
            .ok_or_else(out_of_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatasetBuilder, NetCDFVersion};

    fn header(numrecs: u64) -> NetCDFHeader {
        let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
        b.add_unlimited_dim("time").unwrap();
        b.add_dim("lat", 3).unwrap();
        b.add_dim("lon", 5).unwrap();
        b.add_var("mask", NetCDFType::NC_BYTE, &["lat", "lon"]).unwrap();
        b.add_var("temp", NetCDFType::NC_SHORT, &["time", "lat", "lon"]).unwrap();
        b.add_var("time", NetCDFType::NC_FLOAT, &["time"]).unwrap();
        let dataset = b.build().unwrap();
        let layout = Layout::compute(&dataset, 0).unwrap();
        NetCDFHeader {
            dataset,
            numrecs,
            layout,
        }
    }

    #[test]
    fn record_region_strides_by_record_size() {
        let h = header(2);
        // 15 shorts padded to 32 bytes, plus 4 bytes of `time`
        assert_eq!(h.layout.record_size, 36);
        let r = h.region("temp").unwrap();
        assert_eq!(r.chunk_len, 15);
        assert_eq!(r.chunk_bytes(), 30);
        assert_eq!(r.num_chunks, 2);
        let first = r.chunk_range(0).unwrap();
        let second = r.chunk_range(1).unwrap();
        assert_eq!(second.start - first.start, 36);
        assert_eq!(r.chunk_range(2), None);
        assert_eq!(r.end(), Some(second.end));
    }

    #[test]
    fn zero_records_give_empty_regions() {
        let h = header(0);
        let r = h.region("time").unwrap();
        assert!(r.is_empty());
        assert_eq!(r.end(), Some(r.begin));
        assert_eq!(h.shape("temp").unwrap(), vec![0, 3, 5]);
    }

    #[test]
    fn element_offsets() {
        let h = header(2);
        let mask = h.var("mask").unwrap().1.begin;
        assert_eq!(h.element_offset("mask", &[1, 2]).unwrap(), mask + 7);
        let temp = h.var("temp").unwrap().1.begin;
        assert_eq!(h.element_offset("temp", &[0, 0, 0]).unwrap(), temp);
        assert_eq!(h.element_offset("temp", &[1, 2, 4]).unwrap(), temp + 36 + 2 * 14);
        assert!(matches!(
            h.element_offset("temp", &[2, 0, 0]).unwrap_err(),
            Error::IndexOutOfBounds { .. }
        ));
        assert!(matches!(
            h.element_offset("temp", &[0, 0]).unwrap_err(),
            Error::IndexOutOfBounds { .. }
        ));
        assert!(matches!(
            h.element_offset("nope", &[]).unwrap_err(),
            Error::UnknownVariable(_)
        ));
    }

    #[test]
    fn end_past_u64_is_none() {
        let r = VariableRegion {
            nc_type: NetCDFType::NC_INT,
            begin: u64::MAX - 8,
            chunk_len: 2,
            num_chunks: 2,
            stride: 8,
        };
        assert_eq!(r.end(), None);
        assert_eq!(VariableRegion { num_chunks: 1, ..r }.end(), Some(u64::MAX));
    }
}
