//! Reading datasets from memory or from files
//!
//! The header is parsed in one pass; variable data is only decoded when a
//! variable or record is requested.
use crate::codec::decode;
use crate::error::{Error, Result};
use crate::model::{
    Dataset, Layout, NetCDFData, NetCDFHeader, NetCDFValue, VarLayout, VariableRegion,
};
use crate::parser::{parse_header, NumberOfRecords, RawHeader};
use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Number of bytes read before the first attempt to parse a header
const INITIAL_HEADER_READ: u64 = 8 * 1024;

impl NetCDFHeader {
    /// Parse the header at the start of `input`, which holds the whole file
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let (raw, consumed) = parse_header(input)?;
        NetCDFHeader::from_raw(raw, consumed, input.len() as u64)
    }

    /// Parse the header of a file, reading only as much as the header needs
    pub fn from_file<F: Read + Seek>(file: &mut F) -> Result<Self> {
        let total = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = INITIAL_HEADER_READ;
        loop {
            let n = (&mut *file).take(chunk).read_to_end(&mut buffer)?;
            match parse_header(&buffer) {
                Err(e) if e.is_incomplete() && n as u64 == chunk => {
                    chunk *= 2;
                }
                Err(e) => return Err(e),
                Ok((raw, consumed)) => return NetCDFHeader::from_raw(raw, consumed, total),
            }
        }
    }

    /// Derive the layout of a parsed header and resolve its record count.
    /// `input_len` is the length of the whole file.
    pub fn from_raw(raw: RawHeader, header_size: usize, input_len: u64) -> Result<Self> {
        let RawHeader {
            version,
            numrecs,
            dims,
            attrs,
            vars,
        } = raw;
        let mut placements = Vec::with_capacity(vars.len());
        let mut definitions = Vec::with_capacity(vars.len());
        for parsed in vars {
            placements.push((parsed.vsize, parsed.begin));
            definitions.push(parsed.variable);
        }
        let dataset = Dataset::from_parts(version, dims, attrs, definitions);

        let too_large = |name: &str| Error::VariableTooLarge(name.to_string());
        let mut vars: Vec<VarLayout> = Vec::with_capacity(placements.len());
        let mut record_size: u64 = 0;
        for (var, (vsize, begin)) in dataset.vars().iter().zip(placements) {
            let chunk_len = dataset.chunk_len(var).ok_or_else(|| too_large(var.name()))?;
            let chunk_size = dataset.chunk_size(var).ok_or_else(|| too_large(var.name()))?;
            if dataset.is_record_var(var) {
                record_size = record_size
                    .checked_add(chunk_size)
                    .ok_or_else(|| too_large(var.name()))?;
            }
            vars.push(VarLayout {
                vsize,
                chunk_len,
                chunk_size,
                begin,
            });
        }
        let layout = Layout {
            header_size: header_size as u64,
            record_size,
            vars,
        };

        let numrecs = match numrecs {
            NumberOfRecords::NonNegative(n) => u64::from(n),
            NumberOfRecords::Streaming => streaming_records(&dataset, &layout, input_len)?,
        };
        debug!(
            "read header: {:?}, {} dimensions, {} variables, {} records",
            dataset.version(),
            dataset.dims().len(),
            dataset.vars().len(),
            numrecs
        );
        Ok(NetCDFHeader {
            dataset,
            numrecs,
            layout,
        })
    }
}

/// Number of records of a file whose header holds the streaming marker
fn streaming_records(dataset: &Dataset, layout: &Layout, input_len: u64) -> Result<u64> {
    let first = match layout.records_begin(dataset) {
        Some(begin) => begin,
        None => return Ok(0),
    };
    if layout.record_size == 0 {
        return Ok(0);
    }
    let remaining = input_len.saturating_sub(first);
    if remaining % layout.record_size != 0 {
        return Err(Error::StreamingRecordCount {
            remaining,
            record_size: layout.record_size,
        });
    }
    let numrecs = remaining / layout.record_size;
    warn!(
        "streaming record count resolved from the input length: {} records",
        numrecs
    );
    Ok(numrecs)
}

fn check_bounds(name: &str, region: &VariableRegion, len: u64) -> Result<()> {
    let end = region.end().unwrap_or(u64::MAX);
    if end > len {
        return Err(Error::DataOutOfBounds {
            var: name.to_string(),
            end,
            len,
        });
    }
    Ok(())
}

fn record_region(header: &NetCDFHeader, name: &str, record: u64) -> Result<VariableRegion> {
    if !header.is_record_var(name)? {
        return Err(Error::NotARecordVariable(name.to_string()));
    }
    let region = header.region(name)?;
    if record >= region.num_chunks {
        return Err(Error::RecordIndexOutOfRange {
            var: name.to_string(),
            index: record,
            numrecs: region.num_chunks,
        });
    }
    Ok(VariableRegion {
        begin: region.begin + record * region.stride,
        num_chunks: 1,
        ..region
    })
}

fn scalar(name: &str, data: NetCDFData) -> Result<NetCDFValue> {
    match data.len() {
        1 => data.get(0).ok_or_else(|| Error::NotScalar(name.to_string())),
        _ => Err(Error::NotScalar(name.to_string())),
    }
}

/// A dataset held in memory
///
/// ```
/// use ncclassic::{DatasetBuilder, DatasetView, DatasetWriter, NetCDFType, NetCDFVersion};
///
/// let mut builder = DatasetBuilder::new(NetCDFVersion::Classic);
/// builder.add_var("answer", NetCDFType::NC_INT, &[])?;
/// let mut writer = DatasetWriter::new(builder.build()?)?;
/// writer.put_var("answer", vec![42i32])?;
/// let bytes = writer.to_bytes()?;
///
/// let view = DatasetView::new(&bytes)?;
/// assert_eq!(view.read_scalar("answer")?, ncclassic::NetCDFValue::Int(42));
/// # Ok::<(), ncclassic::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    bytes: &'a [u8],
    header: NetCDFHeader,
}

impl<'a> DatasetView<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let header = NetCDFHeader::from_bytes(bytes)?;
        Ok(DatasetView { bytes, header })
    }

    pub fn header(&self) -> &NetCDFHeader {
        &self.header
    }

    pub fn dataset(&self) -> &Dataset {
        &self.header.dataset
    }

    pub fn num_records(&self) -> u64 {
        self.header.numrecs
    }

    /// Raw bytes of each chunk of a variable, padding excluded: one chunk for
    /// a fixed variable, one per record for a record variable
    pub fn var_bytes(&self, name: &str) -> Result<Vec<&'a [u8]>> {
        let region = self.header.region(name)?;
        self.chunks(name, &region)
    }

    fn chunks(&self, name: &str, region: &VariableRegion) -> Result<Vec<&'a [u8]>> {
        check_bounds(name, region, self.bytes.len() as u64)?;
        let bytes: &'a [u8] = self.bytes;
        Ok((0..region.num_chunks)
            .filter_map(|i| region.chunk_range(i))
            .map(|r| &bytes[r.start as usize..r.end as usize])
            .collect())
    }

    fn decode_region(&self, name: &str, region: &VariableRegion) -> Result<NetCDFData> {
        let mut data = NetCDFData::fill(region.nc_type, 0);
        for chunk in self.chunks(name, region)? {
            data.extend_from(decode(region.nc_type, chunk));
        }
        Ok(data)
    }

    /// All elements of a variable, records concatenated
    pub fn read_var(&self, name: &str) -> Result<NetCDFData> {
        let region = self.header.region(name)?;
        self.decode_region(name, &region)
    }

    /// Elements of one record of a record variable
    pub fn read_record(&self, name: &str, record: u64) -> Result<NetCDFData> {
        let region = record_region(&self.header, name, record)?;
        self.decode_region(name, &region)
    }

    /// The single element of a scalar variable
    pub fn read_scalar(&self, name: &str) -> Result<NetCDFValue> {
        scalar(name, self.read_var(name)?)
    }

    /// Data of every variable, in declaration order
    pub fn read_all_vars(&self) -> Result<Vec<(String, NetCDFData)>> {
        self.dataset()
            .vars()
            .iter()
            .map(|var| Ok((var.name().to_string(), self.read_var(var.name())?)))
            .collect()
    }
}

/// A dataset read from a seekable source, typically a file
#[derive(Debug)]
pub struct NetCDF<F: Seek + Read> {
    file: F,
    header: NetCDFHeader,
    len: u64,
}

impl<F: Seek + Read> NetCDF<F> {
    pub fn new_from_file(mut file: F) -> Result<Self> {
        let header = NetCDFHeader::from_file(&mut file)?;
        let len = file.seek(SeekFrom::End(0))?;
        Ok(NetCDF { file, header, len })
    }

    pub fn header(&self) -> &NetCDFHeader {
        &self.header
    }

    /// Fill `buffer` with the raw bytes starting at element `start` of
    /// `variable`
    pub fn update_buffer(
        &mut self,
        variable: &str,
        start: &[usize],
        buffer: &mut [u8],
    ) -> Result<()> {
        let pos = self.header.element_offset(variable, start)?;
        let end = pos.saturating_add(buffer.len() as u64);
        if end > self.len {
            return Err(Error::DataOutOfBounds {
                var: variable.to_string(),
                end,
                len: self.len,
            });
        }
        self.file.seek(SeekFrom::Start(pos))?;
        self.file.read_exact(buffer)?;
        Ok(())
    }

    fn decode_region(&mut self, name: &str, region: &VariableRegion) -> Result<NetCDFData> {
        check_bounds(name, region, self.len)?;
        let mut data = NetCDFData::fill(region.nc_type, 0);
        let mut buffer = vec![0u8; region.chunk_bytes() as usize];
        for i in 0..region.num_chunks {
            self.file
                .seek(SeekFrom::Start(region.begin + i * region.stride))?;
            self.file.read_exact(&mut buffer)?;
            data.extend_from(decode(region.nc_type, &buffer));
        }
        Ok(data)
    }

    pub fn read_var(&mut self, name: &str) -> Result<NetCDFData> {
        let region = self.header.region(name)?;
        self.decode_region(name, &region)
    }

    pub fn read_record(&mut self, name: &str, record: u64) -> Result<NetCDFData> {
        let region = record_region(&self.header, name, record)?;
        self.decode_region(name, &region)
    }

    pub fn read_scalar(&mut self, name: &str) -> Result<NetCDFValue> {
        let data = self.read_var(name)?;
        scalar(name, data)
    }

    /// Data of every variable, in declaration order
    pub fn read_all_vars(&mut self) -> Result<Vec<(String, NetCDFData)>> {
        let names: Vec<String> = self
            .header
            .dataset
            .vars()
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        names
            .into_iter()
            .map(|name| {
                let data = self.read_var(&name)?;
                Ok((name, data))
            })
            .collect()
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

impl NetCDF<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        NetCDF::new_from_file(file)
    }
}
