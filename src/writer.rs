//! Writing datasets
//!
//! A [`DatasetWriter`] freezes the layout of a [`Dataset`] when it is
//! created, collects variable data, then emits the whole file in one
//! sequential pass. Whatever was not supplied is written as fill values.
use crate::codec::{encode, write_fill, write_fill_padding, write_header, write_zeros};
use crate::error::{Error, Result};
use crate::model::{Dataset, Layout, NetCDFData, NetCDFHeader, NetCDFType, NetCDFVariable};
use crate::utils::padding;
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Bytes used to pad each data block to a 4-byte boundary
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DataPadding {
    /// Repeat the fill value pattern of the element type
    Fill,
    Zero,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct WriterConfig {
    /// Space reserved for the header, the data starting no earlier than this
    pub header_min_size: u64,
    pub data_padding: DataPadding,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            header_min_size: 0,
            data_padding: DataPadding::Fill,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetWriter {
    dataset: Dataset,
    layout: Layout,
    config: WriterConfig,
    /// Data of fixed variables, by variable index
    fixed: Vec<Option<NetCDFData>>,
    /// Records of record variables, by variable index then record index
    records: Vec<BTreeMap<u64, NetCDFData>>,
    /// Record count set with `set_num_records`
    explicit_numrecs: Option<u64>,
    /// First record variable supplied as a whole, and its record count
    whole: Option<(String, u64)>,
}

impl DatasetWriter {
    pub fn new(dataset: Dataset) -> Result<Self> {
        DatasetWriter::with_config(dataset, WriterConfig::default())
    }

    pub fn with_config(dataset: Dataset, config: WriterConfig) -> Result<Self> {
        let layout = Layout::compute(&dataset, config.header_min_size)?;
        let count = dataset.vars().len();
        Ok(DatasetWriter {
            dataset,
            layout,
            config,
            fixed: vec![None; count],
            records: vec![BTreeMap::new(); count],
            explicit_numrecs: None,
            whole: None,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn lookup(&self, name: &str, data: &NetCDFData) -> Result<(usize, &NetCDFVariable)> {
        let index = self
            .dataset
            .var_index(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        let var = &self.dataset.vars()[index];
        if var.nc_type() != data.nc_type() {
            return Err(Error::TypeMismatch {
                var: name.to_string(),
                expected: var.nc_type(),
                got: data.nc_type(),
            });
        }
        Ok((index, var))
    }

    /// Highest record index written with `put_record`, plus one
    fn records_touched(&self) -> u64 {
        self.records
            .iter()
            .filter_map(|r| r.keys().next_back())
            .map(|last| last + 1)
            .max()
            .unwrap_or(0)
    }

    /// Supply all elements of a variable, in row-major order. For a record
    /// variable the number of records follows from the length of `data`, and
    /// must agree with every other record variable supplied as a whole.
    pub fn put_var<D: Into<NetCDFData>>(&mut self, name: &str, data: D) -> Result<()> {
        let data = data.into();
        let (index, var) = self.lookup(name, &data)?;
        let chunk_len = self.layout.vars[index].chunk_len;
        let len = data.len() as u64;

        if !self.dataset.is_record_var(var) {
            if len != chunk_len {
                return Err(Error::ShapeMismatch {
                    var: name.to_string(),
                    expected: chunk_len,
                    got: len,
                });
            }
            self.fixed[index] = Some(data);
            return Ok(());
        }

        if len % chunk_len != 0 {
            return Err(Error::ShapeMismatch {
                var: name.to_string(),
                expected: (len / chunk_len + 1).saturating_mul(chunk_len),
                got: len,
            });
        }
        let numrecs = len / chunk_len;
        let expected = match (&self.whole, self.explicit_numrecs) {
            (Some((_, n)), _) => Some(*n),
            (None, Some(n)) => Some(n),
            (None, None) => None,
        };
        if let Some(expected) = expected {
            if numrecs != expected {
                return Err(Error::RecordCountMismatch {
                    var: name.to_string(),
                    expected,
                    got: numrecs,
                });
            }
        }
        let touched = self.records_touched();
        if numrecs < touched {
            return Err(Error::RecordCountMismatch {
                var: name.to_string(),
                expected: touched,
                got: numrecs,
            });
        }

        let step = chunk_len as usize;
        let mut records = BTreeMap::new();
        for r in 0..numrecs {
            let start = r as usize * step;
            if let Some(record) = data.slice(start, start + step) {
                records.insert(r, record);
            }
        }
        self.records[index] = records;
        if self.whole.is_none() {
            self.whole = Some((name.to_string(), numrecs));
        }
        Ok(())
    }

    /// Supply the elements of one record of a record variable
    pub fn put_record<D: Into<NetCDFData>>(
        &mut self,
        name: &str,
        record: u64,
        data: D,
    ) -> Result<()> {
        let data = data.into();
        let (index, var) = self.lookup(name, &data)?;
        if !self.dataset.is_record_var(var) {
            return Err(Error::NotARecordVariable(name.to_string()));
        }
        let chunk_len = self.layout.vars[index].chunk_len;
        if data.len() as u64 != chunk_len {
            return Err(Error::ShapeMismatch {
                var: name.to_string(),
                expected: chunk_len,
                got: data.len() as u64,
            });
        }
        let limit = match (&self.whole, self.explicit_numrecs) {
            (Some((_, n)), _) => Some(*n),
            (None, n) => n,
        };
        if let Some(numrecs) = limit {
            if record >= numrecs {
                return Err(Error::RecordIndexOutOfRange {
                    var: name.to_string(),
                    index: record,
                    numrecs,
                });
            }
        }
        self.records[index].insert(record, data);
        Ok(())
    }

    /// Fix the number of records. Records nobody supplied are written as
    /// fill values.
    pub fn set_num_records(&mut self, numrecs: u64) -> Result<()> {
        if numrecs > 0 && self.dataset.unlimited_dim().is_none() {
            return Err(Error::EmptyDatasetConflict { records: numrecs });
        }
        if let Some((var, n)) = &self.whole {
            if *n != numrecs {
                return Err(Error::RecordCountMismatch {
                    var: var.clone(),
                    expected: numrecs,
                    got: *n,
                });
            }
        }
        for (var, records) in self.dataset.vars().iter().zip(self.records.iter()) {
            if let Some(last) = records.keys().next_back() {
                if *last >= numrecs {
                    return Err(Error::RecordIndexOutOfRange {
                        var: var.name().to_string(),
                        index: *last,
                        numrecs,
                    });
                }
            }
        }
        self.explicit_numrecs = Some(numrecs);
        Ok(())
    }

    /// Number of records that will be written
    pub fn num_records(&self) -> u64 {
        match (&self.whole, self.explicit_numrecs) {
            (_, Some(n)) => n,
            (Some((_, n)), None) => *n,
            (None, None) => self.records_touched(),
        }
    }

    /// The header the written file will carry
    pub fn header(&self) -> NetCDFHeader {
        NetCDFHeader {
            dataset: self.dataset.clone(),
            numrecs: self.num_records(),
            layout: self.layout.clone(),
        }
    }

    fn write_block<W: Write>(
        &self,
        out: &mut W,
        nc_type: NetCDFType,
        chunk_len: u64,
        data: Option<&NetCDFData>,
    ) -> Result<u64> {
        let mut n = match data {
            Some(data) => {
                let bytes = encode(data);
                out.write_all(&bytes)?;
                bytes.len() as u64
            }
            None => write_fill(out, nc_type, chunk_len)?,
        };
        let pad = padding((chunk_len * nc_type.extsize() as u64 % 4) as usize);
        n += match self.config.data_padding {
            DataPadding::Fill => write_fill_padding(out, nc_type, pad)?,
            DataPadding::Zero => write_zeros(out, pad as u64)?,
        };
        Ok(n)
    }

    /// Emit the whole file to `out`, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<u64> {
        let numrecs = self.num_records();
        let mut n = write_header(&mut out, &self.dataset, &self.layout, numrecs)?;
        n += write_zeros(&mut out, self.layout.header_size - n)?;

        let vars = self.dataset.vars();
        for (i, var) in vars.iter().enumerate() {
            if self.dataset.is_record_var(var) {
                continue;
            }
            debug_assert_eq!(n, self.layout.vars[i].begin);
            let chunk_len = self.layout.vars[i].chunk_len;
            n += self.write_block(&mut out, var.nc_type(), chunk_len, self.fixed[i].as_ref())?;
        }
        for record in 0..numrecs {
            for (i, var) in vars.iter().enumerate() {
                if !self.dataset.is_record_var(var) {
                    continue;
                }
                let chunk_len = self.layout.vars[i].chunk_len;
                n += self.write_block(
                    &mut out,
                    var.nc_type(),
                    chunk_len,
                    self.records[i].get(&record),
                )?;
            }
        }
        out.flush()?;
        debug!(
            "wrote {} bytes: {} variables, {} records",
            n,
            vars.len(),
            numrecs
        );
        Ok(n)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the file at `path`, flushed and synced before returning
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let mut out = BufWriter::new(File::create(path)?);
        let n = self.write_to(&mut out)?;
        out.into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;
        Ok(n)
    }
}
