//! In-memory model of a NetCDF classic dataset
//!
//! A [`Dataset`] is the definition part of a file: dimensions, global
//! attributes and variable declarations. It is assembled with a
//! [`DatasetBuilder`] (or parsed from a header) and never changes afterwards.
//! Offsets live apart from it in a [`Layout`], and a [`NetCDFHeader`] ties both
//! together with the number of records.
use crate::constants_and_types as csts;
use crate::error::{Error, Namespace, Result};
use crate::utils::{checked_padded, is_valid_name};

mod builder;
mod header;
mod layout;

pub use builder::DatasetBuilder;
pub use header::{NetCDFHeader, VariableRegion};
pub use layout::{header_len, Layout, VarLayout};

/// Supported NetCDF versions
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NetCDFVersion {
    /// `CDF\x01`, 32-bit begin offsets
    Classic,
    /// `CDF\x02`, 64-bit begin offsets
    Offset64,
}

impl NetCDFVersion {
    /// Version byte following the magic bytes
    pub fn byte(&self) -> u8 {
        match self {
            NetCDFVersion::Classic => 1,
            NetCDFVersion::Offset64 => 2,
        }
    }

    /// Width of the `begin` field of a variable
    pub fn offset_size(&self) -> usize {
        match self {
            NetCDFVersion::Classic => 4,
            NetCDFVersion::Offset64 => 8,
        }
    }
}

/// NetCDF data format types
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[allow(non_camel_case_types)]
pub enum NetCDFType {
    NC_BYTE,
    NC_CHAR,
    NC_SHORT,
    NC_INT,
    NC_FLOAT,
    NC_DOUBLE,
}

impl NetCDFType {
    /// Get the external size of type in bytes
    pub fn extsize(&self) -> usize {
        match self {
            NetCDFType::NC_BYTE => 1,
            NetCDFType::NC_CHAR => 1,
            NetCDFType::NC_SHORT => 2,
            NetCDFType::NC_INT => 4,
            NetCDFType::NC_FLOAT => 4,
            NetCDFType::NC_DOUBLE => 8,
        }
    }

    /// `nc_type` discriminant stored in headers
    pub fn code(&self) -> u32 {
        match self {
            NetCDFType::NC_BYTE => csts::NC_BYTE,
            NetCDFType::NC_CHAR => csts::NC_CHAR,
            NetCDFType::NC_SHORT => csts::NC_SHORT,
            NetCDFType::NC_INT => csts::NC_INT,
            NetCDFType::NC_FLOAT => csts::NC_FLOAT,
            NetCDFType::NC_DOUBLE => csts::NC_DOUBLE,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            csts::NC_BYTE => Some(NetCDFType::NC_BYTE),
            csts::NC_CHAR => Some(NetCDFType::NC_CHAR),
            csts::NC_SHORT => Some(NetCDFType::NC_SHORT),
            csts::NC_INT => Some(NetCDFType::NC_INT),
            csts::NC_FLOAT => Some(NetCDFType::NC_FLOAT),
            csts::NC_DOUBLE => Some(NetCDFType::NC_DOUBLE),
            _ => None,
        }
    }

    /// Big endian encoding of the default fill value
    pub fn fill_bytes(&self) -> &'static [u8] {
        match self {
            NetCDFType::NC_BYTE => &csts::FILL_BYTES_BYTE,
            NetCDFType::NC_CHAR => &csts::FILL_BYTES_CHAR,
            NetCDFType::NC_SHORT => &csts::FILL_BYTES_SHORT,
            NetCDFType::NC_INT => &csts::FILL_BYTES_INT,
            NetCDFType::NC_FLOAT => &csts::FILL_BYTES_FLOAT,
            NetCDFType::NC_DOUBLE => &csts::FILL_BYTES_DOUBLE,
        }
    }

    /// Default fill value
    pub fn fill_value(&self) -> NetCDFValue {
        match self {
            NetCDFType::NC_BYTE => NetCDFValue::Byte(csts::NC_FILL_BYTE),
            NetCDFType::NC_CHAR => NetCDFValue::Char(csts::NC_FILL_CHAR),
            NetCDFType::NC_SHORT => NetCDFValue::Short(csts::NC_FILL_SHORT),
            NetCDFType::NC_INT => NetCDFValue::Int(csts::NC_FILL_INT),
            NetCDFType::NC_FLOAT => NetCDFValue::Float(csts::NC_FILL_FLOAT),
            NetCDFType::NC_DOUBLE => NetCDFValue::Double(csts::NC_FILL_DOUBLE),
        }
    }
}

/// A single typed element
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum NetCDFValue {
    Byte(i8),
    Char(u8),
    Short(i16),
    Int(i32),
    Float(f32),
    Double(f64),
}

impl NetCDFValue {
    pub fn nc_type(&self) -> NetCDFType {
        match self {
            NetCDFValue::Byte(_) => NetCDFType::NC_BYTE,
            NetCDFValue::Char(_) => NetCDFType::NC_CHAR,
            NetCDFValue::Short(_) => NetCDFType::NC_SHORT,
            NetCDFValue::Int(_) => NetCDFType::NC_INT,
            NetCDFValue::Float(_) => NetCDFType::NC_FLOAT,
            NetCDFValue::Double(_) => NetCDFType::NC_DOUBLE,
        }
    }
}

/// A sequence of elements sharing one type, used for attribute values and
/// variable data
#[derive(Debug, PartialEq, Clone)]
pub enum NetCDFData {
    Byte(Vec<i8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl NetCDFData {
    pub fn nc_type(&self) -> NetCDFType {
        match self {
            NetCDFData::Byte(_) => NetCDFType::NC_BYTE,
            NetCDFData::Char(_) => NetCDFType::NC_CHAR,
            NetCDFData::Short(_) => NetCDFType::NC_SHORT,
            NetCDFData::Int(_) => NetCDFType::NC_INT,
            NetCDFData::Float(_) => NetCDFType::NC_FLOAT,
            NetCDFData::Double(_) => NetCDFType::NC_DOUBLE,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NetCDFData::Byte(v) => v.len(),
            NetCDFData::Char(v) => v.len(),
            NetCDFData::Short(v) => v.len(),
            NetCDFData::Int(v) => v.len(),
            NetCDFData::Float(v) => v.len(),
            NetCDFData::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes of the big endian encoding, without padding
    pub fn byte_len(&self) -> usize {
        self.len() * self.nc_type().extsize()
    }

    pub fn get(&self, index: usize) -> Option<NetCDFValue> {
        match self {
            NetCDFData::Byte(v) => v.get(index).map(|x| NetCDFValue::Byte(*x)),
            NetCDFData::Char(v) => v.get(index).map(|x| NetCDFValue::Char(*x)),
            NetCDFData::Short(v) => v.get(index).map(|x| NetCDFValue::Short(*x)),
            NetCDFData::Int(v) => v.get(index).map(|x| NetCDFValue::Int(*x)),
            NetCDFData::Float(v) => v.get(index).map(|x| NetCDFValue::Float(*x)),
            NetCDFData::Double(v) => v.get(index).map(|x| NetCDFValue::Double(*x)),
        }
    }

    /// `len` copies of the default fill value of `nc_type`
    pub fn fill(nc_type: NetCDFType, len: usize) -> Self {
        match nc_type {
            NetCDFType::NC_BYTE => NetCDFData::Byte(vec![csts::NC_FILL_BYTE; len]),
            NetCDFType::NC_CHAR => NetCDFData::Char(vec![csts::NC_FILL_CHAR; len]),
            NetCDFType::NC_SHORT => NetCDFData::Short(vec![csts::NC_FILL_SHORT; len]),
            NetCDFType::NC_INT => NetCDFData::Int(vec![csts::NC_FILL_INT; len]),
            NetCDFType::NC_FLOAT => NetCDFData::Float(vec![csts::NC_FILL_FLOAT; len]),
            NetCDFType::NC_DOUBLE => NetCDFData::Double(vec![csts::NC_FILL_DOUBLE; len]),
        }
    }

    /// Sub-sequence `start..end`, `None` if out of range
    pub fn slice(&self, start: usize, end: usize) -> Option<NetCDFData> {
        if start > end || end > self.len() {
            return None;
        }
        Some(match self {
            NetCDFData::Byte(v) => NetCDFData::Byte(v[start..end].to_vec()),
            NetCDFData::Char(v) => NetCDFData::Char(v[start..end].to_vec()),
            NetCDFData::Short(v) => NetCDFData::Short(v[start..end].to_vec()),
            NetCDFData::Int(v) => NetCDFData::Int(v[start..end].to_vec()),
            NetCDFData::Float(v) => NetCDFData::Float(v[start..end].to_vec()),
            NetCDFData::Double(v) => NetCDFData::Double(v[start..end].to_vec()),
        })
    }

    /// Append `other`, which must hold the same type
    pub(crate) fn extend_from(&mut self, other: NetCDFData) -> bool {
        match (self, other) {
            (NetCDFData::Byte(a), NetCDFData::Byte(b)) => a.extend(b),
            (NetCDFData::Char(a), NetCDFData::Char(b)) => a.extend(b),
            (NetCDFData::Short(a), NetCDFData::Short(b)) => a.extend(b),
            (NetCDFData::Int(a), NetCDFData::Int(b)) => a.extend(b),
            (NetCDFData::Float(a), NetCDFData::Float(b)) => a.extend(b),
            (NetCDFData::Double(a), NetCDFData::Double(b)) => a.extend(b),
            _ => return false,
        }
        true
    }

    pub fn as_i8(&self) -> Option<&[i8]> {
        match self {
            NetCDFData::Byte(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            NetCDFData::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<&[i16]> {
        match self {
            NetCDFData::Short(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            NetCDFData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            NetCDFData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            NetCDFData::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Character data as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NetCDFData::Char(v) => std::str::from_utf8(v).ok(),
            _ => None,
        }
    }
}

impl From<Vec<i8>> for NetCDFData {
    fn from(v: Vec<i8>) -> Self {
        NetCDFData::Byte(v)
    }
}

impl From<Vec<u8>> for NetCDFData {
    fn from(v: Vec<u8>) -> Self {
        NetCDFData::Char(v)
    }
}

impl From<Vec<i16>> for NetCDFData {
    fn from(v: Vec<i16>) -> Self {
        NetCDFData::Short(v)
    }
}

impl From<Vec<i32>> for NetCDFData {
    fn from(v: Vec<i32>) -> Self {
        NetCDFData::Int(v)
    }
}

impl From<Vec<f32>> for NetCDFData {
    fn from(v: Vec<f32>) -> Self {
        NetCDFData::Float(v)
    }
}

impl From<Vec<f64>> for NetCDFData {
    fn from(v: Vec<f64>) -> Self {
        NetCDFData::Double(v)
    }
}

impl From<&str> for NetCDFData {
    fn from(s: &str) -> Self {
        NetCDFData::Char(s.as_bytes().to_vec())
    }
}

impl From<NetCDFValue> for NetCDFData {
    fn from(v: NetCDFValue) -> Self {
        match v {
            NetCDFValue::Byte(x) => NetCDFData::Byte(vec![x]),
            NetCDFValue::Char(x) => NetCDFData::Char(vec![x]),
            NetCDFValue::Short(x) => NetCDFData::Short(vec![x]),
            NetCDFValue::Int(x) => NetCDFData::Int(vec![x]),
            NetCDFValue::Float(x) => NetCDFData::Float(vec![x]),
            NetCDFValue::Double(x) => NetCDFData::Double(vec![x]),
        }
    }
}

/// NetCDF Dimension
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NetCDFDimension {
    name: String,
    /// `None` marks the unlimited (record) dimension
    size: Option<u32>,
}

impl NetCDFDimension {
    /// Create new NetCDF dimension
    pub fn new(name: String, size: Option<u32>) -> Self {
        NetCDFDimension { name, size }
    }

    /// Dimension as stored on disk, where size 0 is the unlimited marker
    pub(crate) fn from_disk(name: String, size: u32) -> Self {
        match size {
            csts::ZERO => NetCDFDimension::new(name, None),
            n => NetCDFDimension::new(name, Some(n)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Option<u32> {
        self.size
    }

    pub fn is_unlimited(&self) -> bool {
        self.size.is_none()
    }
}

/// NetCDF Attribute
#[derive(Debug, PartialEq, Clone)]
pub struct NetCDFAttribute {
    name: String,
    data: NetCDFData,
}

impl NetCDFAttribute {
    /// Create a new NetCDF Attribute
    pub fn new(name: String, data: NetCDFData) -> Self {
        NetCDFAttribute { name, data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nc_type(&self) -> NetCDFType {
        self.data.nc_type()
    }

    pub fn data(&self) -> &NetCDFData {
        &self.data
    }
}

/// NetCDF Variable declaration
#[derive(Debug, PartialEq, Clone)]
pub struct NetCDFVariable {
    name: String,
    /// Indices into the dimension list of the dataset, outermost first
    dims: Vec<u32>,
    attributes: Vec<NetCDFAttribute>,
    nc_type: NetCDFType,
}

impl NetCDFVariable {
    /// Generate a new variable
    pub fn new(
        name: String,
        dims: Vec<u32>,
        attributes: Vec<NetCDFAttribute>,
        nc_type: NetCDFType,
    ) -> Self {
        NetCDFVariable {
            name,
            dims,
            attributes,
            nc_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    pub fn attributes(&self) -> &[NetCDFAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&NetCDFAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nc_type(&self) -> NetCDFType {
        self.nc_type
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }
}

/// Definition part of a NetCDF classic file
#[derive(Debug, PartialEq, Clone)]
pub struct Dataset {
    version: NetCDFVersion,
    dims: Vec<NetCDFDimension>,
    attrs: Vec<NetCDFAttribute>,
    vars: Vec<NetCDFVariable>,
}

impl Dataset {
    /// Assemble a dataset and check every structural invariant
    pub fn new(
        version: NetCDFVersion,
        dims: Vec<NetCDFDimension>,
        attrs: Vec<NetCDFAttribute>,
        vars: Vec<NetCDFVariable>,
    ) -> Result<Self> {
        let dataset = Dataset {
            version,
            dims,
            attrs,
            vars,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Definition read from a header. The parser checks the structure but not
    /// the naming rules, so files written by other tools stay readable.
    pub(crate) fn from_parts(
        version: NetCDFVersion,
        dims: Vec<NetCDFDimension>,
        attrs: Vec<NetCDFAttribute>,
        vars: Vec<NetCDFVariable>,
    ) -> Self {
        Dataset {
            version,
            dims,
            attrs,
            vars,
        }
    }

    pub fn version(&self) -> NetCDFVersion {
        self.version
    }

    /// Same definition, written with another format version
    pub fn with_version(mut self, version: NetCDFVersion) -> Self {
        self.version = version;
        self
    }

    pub fn dims(&self) -> &[NetCDFDimension] {
        &self.dims
    }

    pub fn attrs(&self) -> &[NetCDFAttribute] {
        &self.attrs
    }

    pub fn vars(&self) -> &[NetCDFVariable] {
        &self.vars
    }

    pub fn dim(&self, name: &str) -> Option<&NetCDFDimension> {
        self.dims.iter().find(|d| d.name == name)
    }

    pub fn attr(&self, name: &str) -> Option<&NetCDFAttribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn var(&self, name: &str) -> Option<&NetCDFVariable> {
        self.vars.iter().find(|v| v.name == name)
    }

    pub fn var_index(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }

    /// The unlimited dimension and its index, if any
    pub fn unlimited_dim(&self) -> Option<(usize, &NetCDFDimension)> {
        self.dims.iter().enumerate().find(|(_, d)| d.is_unlimited())
    }

    /// A record variable has the unlimited dimension as outermost dimension
    pub fn is_record_var(&self, var: &NetCDFVariable) -> bool {
        is_record(&self.dims, &var.dims)
    }

    /// Number of elements per record (record variables) or in total (fixed
    /// variables), `None` if it does not fit in 64 bits
    pub fn chunk_len(&self, var: &NetCDFVariable) -> Option<u64> {
        chunk_len(&self.dims, &var.dims)
    }

    /// Bytes of one chunk of `var`, padding included
    pub fn chunk_size(&self, var: &NetCDFVariable) -> Option<u64> {
        chunk_size(&self.dims, &var.dims, var.nc_type)
    }

    /// Dimension lengths of `var`, the unlimited one taken as `numrecs`
    pub fn shape(&self, var: &NetCDFVariable, numrecs: u64) -> Vec<u64> {
        var.dims
            .iter()
            .filter_map(|id| self.dims.get(*id as usize))
            .map(|d| d.size.map_or(numrecs, u64::from))
            .collect()
    }

    /// Check names, uniqueness, dimension references and the position of the
    /// unlimited dimension
    pub fn validate(&self) -> Result<()> {
        let mut unlimited: Option<&str> = None;
        for (i, dim) in self.dims.iter().enumerate() {
            check_name(&dim.name)?;
            if self.dims[..i].iter().any(|d| d.name == dim.name) {
                return Err(Error::DuplicateName {
                    namespace: Namespace::Dimension,
                    name: dim.name.clone(),
                });
            }
            match dim.size {
                None => {
                    if let Some(first) = unlimited {
                        return Err(Error::MultipleUnlimitedDimensions {
                            first: first.to_string(),
                            second: dim.name.clone(),
                        });
                    }
                    unlimited = Some(&dim.name);
                }
                Some(size) if size == 0 || size > csts::MAX_DIM_SIZE => {
                    return Err(Error::InvalidDimensionSize {
                        name: dim.name.clone(),
                        size,
                    })
                }
                Some(_) => {}
            }
        }
        check_attributes(&self.attrs)?;
        for (i, var) in self.vars.iter().enumerate() {
            check_name(&var.name)?;
            if self.vars[..i].iter().any(|v| v.name == var.name) {
                return Err(Error::DuplicateName {
                    namespace: Namespace::Variable,
                    name: var.name.clone(),
                });
            }
            for (position, id) in var.dims.iter().enumerate() {
                let dim = self
                    .dims
                    .get(*id as usize)
                    .ok_or_else(|| Error::DimensionIndexOutOfRange {
                        var: var.name.clone(),
                        index: *id,
                        count: self.dims.len(),
                    })?;
                if dim.is_unlimited() && position > 0 {
                    return Err(Error::UnlimitedNotOutermost {
                        var: var.name.clone(),
                        dim: dim.name.clone(),
                    });
                }
            }
            check_attributes(&var.attributes)?;
        }
        Ok(())
    }
}

fn is_record(dims: &[NetCDFDimension], ids: &[u32]) -> bool {
    ids.first()
        .and_then(|id| dims.get(*id as usize))
        .map_or(false, |d| d.is_unlimited())
}

/// Elements of one chunk of a variable over the dimensions `ids`
pub(crate) fn chunk_len(dims: &[NetCDFDimension], ids: &[u32]) -> Option<u64> {
    let skip = if is_record(dims, ids) { 1 } else { 0 };
    ids.iter()
        .skip(skip)
        .filter_map(|id| dims.get(*id as usize))
        .try_fold(1u64, |n, d| n.checked_mul(u64::from(d.size.unwrap_or(0))))
}

/// Padded bytes of one chunk of a variable over the dimensions `ids`
pub(crate) fn chunk_size(
    dims: &[NetCDFDimension],
    ids: &[u32],
    nc_type: NetCDFType,
) -> Option<u64> {
    chunk_len(dims, ids)?
        .checked_mul(nc_type.extsize() as u64)
        .and_then(checked_padded)
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

fn check_attributes(attrs: &[NetCDFAttribute]) -> Result<()> {
    for (i, attr) in attrs.iter().enumerate() {
        check_name(&attr.name)?;
        if attrs[..i].iter().any(|a| a.name == attr.name) {
            return Err(Error::DuplicateName {
                namespace: Namespace::Attribute,
                name: attr.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_bytes_match_fill_values() {
        assert_eq!(csts::NC_FILL_BYTE.to_be_bytes(), csts::FILL_BYTES_BYTE);
        assert_eq!(csts::NC_FILL_CHAR.to_be_bytes(), csts::FILL_BYTES_CHAR);
        assert_eq!(csts::NC_FILL_SHORT.to_be_bytes(), csts::FILL_BYTES_SHORT);
        assert_eq!(csts::NC_FILL_INT.to_be_bytes(), csts::FILL_BYTES_INT);
        assert_eq!(csts::NC_FILL_FLOAT.to_be_bytes(), csts::FILL_BYTES_FLOAT);
        assert_eq!(csts::NC_FILL_DOUBLE.to_be_bytes(), csts::FILL_BYTES_DOUBLE);
    }

    #[test]
    fn type_codes_round_trip() {
        for t in [
            NetCDFType::NC_BYTE,
            NetCDFType::NC_CHAR,
            NetCDFType::NC_SHORT,
            NetCDFType::NC_INT,
            NetCDFType::NC_FLOAT,
            NetCDFType::NC_DOUBLE,
        ]
        .iter()
        {
            assert_eq!(NetCDFType::from_code(t.code()), Some(*t));
            assert_eq!(t.fill_bytes().len(), t.extsize());
        }
        assert_eq!(NetCDFType::from_code(0), None);
        assert_eq!(NetCDFType::from_code(7), None);
    }

    #[test]
    fn chunk_len_overflow_is_none() {
        let big = Some(i32::MAX as u32);
        let dims = vec![
            NetCDFDimension::new("x".to_string(), big),
            NetCDFDimension::new("y".to_string(), big),
            NetCDFDimension::new("z".to_string(), big),
        ];
        assert_eq!(chunk_len(&dims, &[0, 1]), Some((i32::MAX as u64).pow(2)));
        assert_eq!(chunk_len(&dims, &[0, 1, 2]), None);
        // fits as elements, not as doubles
        let four = vec![NetCDFDimension::new("w".to_string(), Some(4))];
        let mut dims = dims;
        dims.extend(four);
        assert_eq!(
            chunk_size(&dims, &[0, 1, 3], NetCDFType::NC_BYTE),
            Some((i32::MAX as u64).pow(2) * 4)
        );
        assert_eq!(chunk_size(&dims, &[0, 1, 3], NetCDFType::NC_DOUBLE), None);
    }

    #[test]
    fn chunk_len_skips_record_dimension() {
        let ds = Dataset::new(
            NetCDFVersion::Classic,
            vec![
                NetCDFDimension::new("time".to_string(), None),
                NetCDFDimension::new("lat".to_string(), Some(3)),
                NetCDFDimension::new("lon".to_string(), Some(5)),
            ],
            vec![],
            vec![
                NetCDFVariable::new("t".to_string(), vec![0, 1, 2], vec![], NetCDFType::NC_INT),
                NetCDFVariable::new("m".to_string(), vec![1, 2], vec![], NetCDFType::NC_INT),
                NetCDFVariable::new("s".to_string(), vec![], vec![], NetCDFType::NC_INT),
            ],
        )
        .unwrap();
        let t = &ds.vars()[0];
        assert!(ds.is_record_var(t));
        assert_eq!(ds.chunk_len(t), Some(15));
        assert_eq!(ds.chunk_size(t), Some(60));
        assert_eq!(ds.shape(t, 2), vec![2, 3, 5]);
        let m = &ds.vars()[1];
        assert!(!ds.is_record_var(m));
        assert_eq!(ds.chunk_len(m), Some(15));
        let s = &ds.vars()[2];
        assert!(s.is_scalar());
        assert_eq!(ds.chunk_len(s), Some(1));
        assert!(ds.shape(s, 0).is_empty());
    }

    #[test]
    fn unlimited_must_be_outermost() {
        let err = Dataset::new(
            NetCDFVersion::Classic,
            vec![
                NetCDFDimension::new("lat".to_string(), Some(3)),
                NetCDFDimension::new("time".to_string(), None),
            ],
            vec![],
            vec![NetCDFVariable::new(
                "v".to_string(),
                vec![0, 1],
                vec![],
                NetCDFType::NC_FLOAT,
            )],
        )
        .unwrap_err();
        match err {
            Error::UnlimitedNotOutermost { var, dim } => {
                assert_eq!(var, "v");
                assert_eq!(dim, "time");
            }
            _ => panic!("Unexpected error: {:?}", err),
        }
    }

    #[test]
    fn dimension_index_checked() {
        let err = Dataset::new(
            NetCDFVersion::Classic,
            vec![NetCDFDimension::new("x".to_string(), Some(2))],
            vec![],
            vec![NetCDFVariable::new(
                "v".to_string(),
                vec![1],
                vec![],
                NetCDFType::NC_BYTE,
            )],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionIndexOutOfRange { index: 1, count: 1, .. }
        ));
    }

    #[test]
    fn data_accessors() {
        let data = NetCDFData::from(vec![1.5f64, 2.5, 3.5]);
        assert_eq!(data.nc_type(), NetCDFType::NC_DOUBLE);
        assert_eq!(data.byte_len(), 24);
        assert_eq!(data.get(1), Some(NetCDFValue::Double(2.5)));
        assert_eq!(data.get(3), None);
        assert_eq!(data.slice(1, 3), Some(NetCDFData::Double(vec![2.5, 3.5])));
        assert_eq!(data.slice(2, 4), None);
        assert_eq!(NetCDFData::from("Y").as_str(), Some("Y"));
        assert_eq!(
            NetCDFData::fill(NetCDFType::NC_SHORT, 2),
            NetCDFData::Short(vec![-32767, -32767])
        );
    }
}
