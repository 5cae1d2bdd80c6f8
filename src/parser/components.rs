//! Header components
//!
//! Parsers for the pieces of a header: names, typed values and the three
//! lists (dimensions, attributes, variables). Every parser is streaming, so
//! running out of input yields `nom::Err::Incomplete` rather than an error.
//! Malformed input is reported as `nom::Err::Failure` with a [`FaultKind`].
use crate::codec::decode;
use crate::constants_and_types as csts;
use crate::error::{FaultKind, ParseFault};
use crate::model::{
    chunk_size, NetCDFAttribute, NetCDFData, NetCDFDimension, NetCDFType, NetCDFVariable,
    NetCDFVersion,
};
use crate::utils::padding;
use nom::{
    bytes::streaming::take,
    number::streaming::{be_i32, be_u32, be_u64},
    IResult,
};

pub(crate) type NcResult<I, O> = IResult<I, O, ParseFault<I>>;

/// Abort parsing at `i`
pub(crate) fn fault<I, O>(i: I, kind: FaultKind) -> NcResult<I, O> {
    Err(nom::Err::Failure(ParseFault::new(i, kind)))
}

/// Parse a big endian 32-bit word [atomic]
pub fn word(i: &[u8]) -> NcResult<&[u8], u32> {
    be_u32(i)
}

/// Parse a big endian 64-bit word [atomic]
pub fn long(i: &[u8]) -> NcResult<&[u8], u64> {
    be_u64(i)
}

/// Take `count` raw bytes [atomic]
fn take_bytes(i: &[u8], count: usize) -> NcResult<&[u8], &[u8]> {
    take(count)(i)
}

/// Parse non negative numbers [atomic]
pub fn non_neg(i: &[u8]) -> NcResult<&[u8], u32> {
    let (rest, o) = be_i32(i)?;
    if o < 0 {
        return fault(i, FaultKind::InvalidLength(o));
    }
    Ok((rest, o as u32))
}

/// Parse number of elements [atomic]
pub fn nelems(i: &[u8]) -> NcResult<&[u8], u32> {
    non_neg(i)
}

/// Parse dimension length [atomic]
pub fn dim_length(i: &[u8]) -> NcResult<&[u8], u32> {
    non_neg(i)
}

/// Skip the padding after `count` bytes, which must be zero [atomic]
pub fn zero_padding(i: &[u8], count: usize) -> NcResult<&[u8], ()> {
    let (rest, pad) = take_bytes(i, padding(count))?;
    if pad.iter().any(|b| *b != 0) {
        return fault(i, FaultKind::NonZeroPadding);
    }
    Ok((rest, ()))
}

/// Parse the name of an element (dimension, variable, or attribute) [combined]
pub fn name(i: &[u8]) -> NcResult<&[u8], String> {
    let (rest, count) = nelems(i)?;
    let (rest, bytes) = take_bytes(rest, count as usize)?;
    // names are padded to the next 4-byte boundary
    let (rest, _) = zero_padding(rest, count as usize)?;
    match std::str::from_utf8(bytes) {
        Ok("") => fault(i, FaultKind::EmptyName),
        Ok(name) => Ok((rest, name.to_string())),
        Err(_) => fault(i, FaultKind::UTF8error),
    }
}

/// Parse NetCDF data format types [atomic]
pub fn nc_type(i: &[u8]) -> NcResult<&[u8], NetCDFType> {
    let (rest, o) = word(i)?;
    match NetCDFType::from_code(o) {
        Some(t) => Ok((rest, t)),
        None => fault(i, FaultKind::UnknownNetCDFType(o)),
    }
}

/// Parse `count` padded values of type `nc_type` [combined]
pub fn values(i: &[u8], nc_type: NetCDFType, count: usize) -> NcResult<&[u8], NetCDFData> {
    let size = match count.checked_mul(nc_type.extsize()) {
        Some(size) => size,
        None => return fault(i, FaultKind::InvalidLength(count as i32)),
    };
    let (rest, raw) = take_bytes(i, size)?;
    let (rest, _) = zero_padding(rest, size)?;
    Ok((rest, decode(nc_type, raw)))
}

/// List type
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ListType {
    Absent,
    DimensionList,
    AttributeList,
    VariableList,
}

impl ListType {
    /// Tag announcing the list in a header
    pub fn tag(&self) -> u32 {
        match self {
            ListType::Absent => csts::ZERO,
            ListType::DimensionList => csts::NC_DIMENSION,
            ListType::AttributeList => csts::NC_ATTRIBUTE,
            ListType::VariableList => csts::NC_VARIABLE,
        }
    }
}

/// Parse upcoming list type [atomic]
pub fn list_type(i: &[u8]) -> NcResult<&[u8], ListType> {
    let (rest, o) = word(i)?;
    match o {
        csts::ZERO => {
            let (rest2, o) = word(rest)?;
            if o == csts::ZERO {
                Ok((rest2, ListType::Absent))
            } else {
                fault(rest, FaultKind::NonZeroValue(o))
            }
        }
        csts::NC_DIMENSION => Ok((rest, ListType::DimensionList)),
        csts::NC_VARIABLE => Ok((rest, ListType::VariableList)),
        csts::NC_ATTRIBUTE => Ok((rest, ListType::AttributeList)),
        _ => fault(i, FaultKind::UnsupportedListType(o)),
    }
}

/// Parse the header of a list of kind `expected`, returning its length.
/// An absent list has length zero. [combined]
pub fn list_header(i: &[u8], expected: ListType) -> NcResult<&[u8], u32> {
    let (rest, found) = list_type(i)?;
    match found {
        ListType::Absent => Ok((rest, 0)),
        t if t == expected => nelems(rest),
        t => fault(
            i,
            FaultKind::UnexpectedListTag {
                found: t.tag(),
                expected: expected.tag(),
            },
        ),
    }
}

/// Parse a single NetCDF attribute [combined]
pub fn attribute(i: &[u8]) -> NcResult<&[u8], NetCDFAttribute> {
    let (i, (name, nc_type, nelems)) = nom::sequence::tuple((name, nc_type, nelems))(i)?;
    let (i, data) = values(i, nc_type, nelems as usize)?;
    Ok((i, NetCDFAttribute::new(name, data)))
}

/// Parse a list of NetCDF attributes [combined]
pub fn attribute_list(i: &[u8]) -> NcResult<&[u8], Vec<NetCDFAttribute>> {
    let (mut i, count) = list_header(i, ListType::AttributeList)?;
    let mut result: Vec<NetCDFAttribute> = Vec::new();
    for _ in 0..count {
        let (k, attr) = attribute(i)?;
        if result.iter().any(|a| a.name() == attr.name()) {
            return fault(i, FaultKind::DuplicateName(attr.name().to_string()));
        }
        result.push(attr);
        i = k;
    }
    Ok((i, result))
}

/// Parse a single NetCDF dimension [combined]
pub fn dimension(i: &[u8]) -> NcResult<&[u8], NetCDFDimension> {
    let (i, (name, dim_length)) = nom::sequence::tuple((name, dim_length))(i)?;
    Ok((i, NetCDFDimension::from_disk(name, dim_length)))
}

/// Parse a list of NetCDF dimensions [combined]
pub fn dimension_list(i: &[u8]) -> NcResult<&[u8], Vec<NetCDFDimension>> {
    let (mut i, count) = list_header(i, ListType::DimensionList)?;
    let mut result: Vec<NetCDFDimension> = Vec::new();
    for _ in 0..count {
        let (k, dim) = dimension(i)?;
        if result.iter().any(|d| d.name() == dim.name()) {
            return fault(i, FaultKind::DuplicateName(dim.name().to_string()));
        }
        if dim.is_unlimited() && result.iter().any(|d| d.is_unlimited()) {
            return fault(i, FaultKind::MultipleUnlimitedDimensions);
        }
        result.push(dim);
        i = k;
    }
    Ok((i, result))
}

/// A variable declaration with the offsets stored next to it
#[derive(Debug, PartialEq, Clone)]
pub struct ParsedVariable {
    pub variable: NetCDFVariable,
    pub vsize: u32,
    pub begin: u64,
}

/// Parse a single NetCDF variable, `dims` being the dimensions declared
/// before it [combined]
pub fn variable<'a>(
    i: &'a [u8],
    version: NetCDFVersion,
    dims: &[NetCDFDimension],
) -> NcResult<&'a [u8], ParsedVariable> {
    let start = i;
    let (i, name) = name(i)?;
    let (mut i, ndims) = nelems(i)?;
    let mut ids: Vec<u32> = Vec::new();
    for position in 0..ndims as usize {
        let (k, id) = non_neg(i)?;
        let dim = match dims.get(id as usize) {
            Some(dim) => dim,
            None => {
                return fault(
                    i,
                    FaultKind::DimensionIndexOutOfRange {
                        index: id,
                        count: dims.len(),
                    },
                )
            }
        };
        if dim.is_unlimited() && position > 0 {
            return fault(i, FaultKind::UnlimitedNotOutermost { var: name, position });
        }
        ids.push(id);
        i = k;
    }
    let (i, attributes) = attribute_list(i)?;
    let (i, nc_type) = nc_type(i)?;
    let (i, vsize) = word(i)?;
    let (i, begin) = match version {
        NetCDFVersion::Classic => {
            let (k, r) = non_neg(i)?;
            (k, u64::from(r))
        }
        NetCDFVersion::Offset64 => long(i)?,
    };
    if chunk_size(dims, &ids, nc_type).is_none() {
        return fault(start, FaultKind::VariableTooLarge(name));
    }
    let variable = NetCDFVariable::new(name, ids, attributes, nc_type);
    Ok((
        i,
        ParsedVariable {
            variable,
            vsize,
            begin,
        },
    ))
}

/// Parse a list of NetCDF variables [combined]
pub fn variable_list<'a>(
    i: &'a [u8],
    version: NetCDFVersion,
    dims: &[NetCDFDimension],
) -> NcResult<&'a [u8], Vec<ParsedVariable>> {
    let (mut i, count) = list_header(i, ListType::VariableList)?;
    let mut result: Vec<ParsedVariable> = Vec::new();
    for _ in 0..count {
        let (k, v) = variable(i, version, dims)?;
        if result.iter().any(|p| p.variable.name() == v.variable.name()) {
            return fault(i, FaultKind::DuplicateName(v.variable.name().to_string()));
        }
        result.push(v);
        i = k;
    }
    Ok((i, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(e: nom::Err<ParseFault<&[u8]>>) -> FaultKind {
        match e {
            nom::Err::Failure(f) => f.kind,
            _ => panic!("Unexpected error {:?}", e),
        }
    }

    #[test]
    fn test_nctypes() {
        let types: [u8; 44] = [
            0, 0, 0, 3, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 3, 0, 0, 0, 2, 0,
            0, 0, 5, 0, 0, 0, 6, 0, 0, 0, 4, 0, 0, 0, 4,
        ];
        let expected: [NetCDFType; 11] = [
            NetCDFType::NC_SHORT,
            NetCDFType::NC_CHAR,
            NetCDFType::NC_BYTE,
            NetCDFType::NC_BYTE,
            NetCDFType::NC_BYTE,
            NetCDFType::NC_SHORT,
            NetCDFType::NC_CHAR,
            NetCDFType::NC_FLOAT,
            NetCDFType::NC_DOUBLE,
            NetCDFType::NC_INT,
            NetCDFType::NC_INT,
        ];
        for (factor, exp) in expected.iter().enumerate() {
            let (_, o) = nc_type(&types[(factor * 4)..]).unwrap();
            assert_eq!(o, *exp)
        }
        let e = nc_type(&[0, 0, 0, 7]).unwrap_err();
        assert_eq!(failure(e), FaultKind::UnknownNetCDFType(7));
    }

    #[test]
    fn test_name() {
        let data = [0, 0, 0, 3, b'l', b'a', b't', 0, 0xAA];
        let (rest, o) = name(&data).unwrap();
        assert_eq!(o, "lat");
        assert_eq!(rest, &[0xAA]);

        let data = [0, 0, 0, 4, b't', b'i', b'm', b'e'];
        let (rest, o) = name(&data).unwrap();
        assert_eq!(o, "time");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_bad_names() {
        let e = name(&[0, 0, 0, 3, b'l', b'a', b't', 1]).unwrap_err();
        assert_eq!(failure(e), FaultKind::NonZeroPadding);
        let e = name(&[0, 0, 0, 0]).unwrap_err();
        assert_eq!(failure(e), FaultKind::EmptyName);
        let e = name(&[0, 0, 0, 2, 0xC3, 0x28, 0, 0]).unwrap_err();
        assert_eq!(failure(e), FaultKind::UTF8error);
        let e = name(&[0xFF, 0xFF, 0xFF, 0xFE]).unwrap_err();
        assert_eq!(failure(e), FaultKind::InvalidLength(-2));
        assert!(matches!(
            name(&[0, 0, 0, 5, b'a']).unwrap_err(),
            nom::Err::Incomplete(_)
        ));
    }

    #[test]
    fn test_list_types() {
        let (_, o) = list_type(&[0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(o, ListType::Absent);
        let (_, o) = list_type(&[0, 0, 0, 0x0A]).unwrap();
        assert_eq!(o, ListType::DimensionList);
        let (_, o) = list_type(&[0, 0, 0, 0x0B]).unwrap();
        assert_eq!(o, ListType::VariableList);
        let (_, o) = list_type(&[0, 0, 0, 0x0C]).unwrap();
        assert_eq!(o, ListType::AttributeList);
        let e = list_type(&[0, 0, 0, 0, 0, 0, 0, 1]).unwrap_err();
        assert_eq!(failure(e), FaultKind::NonZeroValue(1));
        let e = list_type(&[0, 0, 0, 0x0D]).unwrap_err();
        assert_eq!(failure(e), FaultKind::UnsupportedListType(0x0D));
        let e = list_header(&[0, 0, 0, 0x0B, 0, 0, 0, 1], ListType::DimensionList).unwrap_err();
        assert_eq!(
            failure(e),
            FaultKind::UnexpectedListTag {
                found: 0x0B,
                expected: 0x0A
            }
        );
    }

    #[test]
    fn test_attribute() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 5, b'u', b'n', b'i', b't', b's', 0, 0, 0,
            0, 0, 0, 2,
            0, 0, 0, 1,
            b'K', 0, 0, 0,
            0, 0, 0, 5, b'r', b'a', b'n', b'g', b'e', 0, 0, 0,
            0, 0, 0, 3,
            0, 0, 0, 3,
            0, 1, 0xFF, 0xFF, 0x7F, 0xFF, 0, 0,
        ];
        let (rest, o) = attribute(&data).unwrap();
        assert_eq!(o, NetCDFAttribute::new("units".to_string(), NetCDFData::from("K")));
        let (rest, o) = attribute(rest).unwrap();
        assert_eq!(o.data(), &NetCDFData::Short(vec![1, -1, 32767]));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_duplicate_attribute() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 0x0C, 0, 0, 0, 2,
            0, 0, 0, 1, b'a', 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 7, 0, 0, 0,
            0, 0, 0, 1, b'a', 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0,
        ];
        let e = attribute_list(&data).unwrap_err();
        assert_eq!(failure(e), FaultKind::DuplicateName("a".to_string()));
    }

    #[test]
    fn test_dimension_list() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 0x0A, 0, 0, 0, 2,
            0, 0, 0, 4, b't', b'i', b'm', b'e', 0, 0, 0, 0,
            0, 0, 0, 3, b'l', b'a', b't', 0, 0, 0, 0, 3,
        ];
        let (rest, o) = dimension_list(&data).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            o,
            vec![
                NetCDFDimension::new("time".to_string(), None),
                NetCDFDimension::new("lat".to_string(), Some(3)),
            ]
        );
    }

    #[test]
    fn test_two_unlimited_dimensions() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 0x0A, 0, 0, 0, 2,
            0, 0, 0, 1, b'a', 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 1, b'b', 0, 0, 0, 0, 0, 0, 0,
        ];
        let e = dimension_list(&data).unwrap_err();
        assert_eq!(failure(e), FaultKind::MultipleUnlimitedDimensions);
    }

    fn dims() -> Vec<NetCDFDimension> {
        vec![
            NetCDFDimension::new("time".to_string(), None),
            NetCDFDimension::new("lat".to_string(), Some(3)),
        ]
    }

    #[test]
    fn test_variable() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 1, b'v', 0, 0, 0,
            0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 1,
            0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 5,
            0, 0, 0, 12,
            0, 0, 0, 0, 0, 0, 1, 0,
        ];
        let (rest, o) = variable(&data, NetCDFVersion::Offset64, &dims()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(o.variable.name(), "v");
        assert_eq!(o.variable.dims(), &[0, 1]);
        assert_eq!(o.variable.nc_type(), NetCDFType::NC_FLOAT);
        assert_eq!(o.vsize, 12);
        assert_eq!(o.begin, 256);

        // classic reads only the first four bytes of begin
        let (rest, o) = variable(&data, NetCDFVersion::Classic, &dims()).unwrap();
        assert_eq!(rest.len(), 4);
        assert_eq!(o.begin, 0);
    }

    #[test]
    fn test_variable_dimension_checks() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 1, b'v', 0, 0, 0,
            0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0,
        ];
        let e = variable(&data, NetCDFVersion::Classic, &dims()).unwrap_err();
        assert_eq!(
            failure(e),
            FaultKind::UnlimitedNotOutermost {
                var: "v".to_string(),
                position: 1
            }
        );

        #[rustfmt::skip]
        let data = [
            0, 0, 0, 1, b'v', 0, 0, 0,
            0, 0, 0, 1, 0, 0, 0, 2,
        ];
        let e = variable(&data, NetCDFVersion::Classic, &dims()).unwrap_err();
        assert_eq!(
            failure(e),
            FaultKind::DimensionIndexOutOfRange { index: 2, count: 2 }
        );
    }

    #[test]
    fn test_variable_too_large() {
        let big = Some(i32::MAX as u32);
        let dims = vec![
            NetCDFDimension::new("x".to_string(), big),
            NetCDFDimension::new("y".to_string(), big),
            NetCDFDimension::new("z".to_string(), big),
        ];
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 4, b'c', b'u', b'b', b'e',
            0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 2,
            0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 6,
            0xFF, 0xFF, 0xFF, 0xFF,
            0, 0, 0, 0, 0, 0, 1, 0,
        ];
        let e = variable(&data, NetCDFVersion::Offset64, &dims).unwrap_err();
        match e {
            nom::Err::Failure(f) => {
                assert_eq!(f.kind, FaultKind::VariableTooLarge("cube".to_string()));
                // positioned at the start of the variable
                assert_eq!(f.input.len(), data.len());
            }
            _ => panic!("Unexpected error: {:?}", e),
        }
    }
}
