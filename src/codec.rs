//! Big endian encoding of values and headers
use crate::constants_and_types as csts;
use crate::model::{Dataset, Layout, NetCDFAttribute, NetCDFData, NetCDFType};
use crate::utils::padding;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{self, Read, Write};

/// Decode big endian elements of type `nc_type`. Trailing bytes that do not
/// make up a whole element are ignored.
pub fn decode(nc_type: NetCDFType, bytes: &[u8]) -> NetCDFData {
    let count = bytes.len() / nc_type.extsize();
    let bytes = &bytes[..count * nc_type.extsize()];
    match nc_type {
        NetCDFType::NC_BYTE => NetCDFData::Byte(bytes.iter().map(|b| *b as i8).collect()),
        NetCDFType::NC_CHAR => NetCDFData::Char(bytes.to_vec()),
        NetCDFType::NC_SHORT => {
            let mut result = vec![0i16; count];
            BigEndian::read_i16_into(bytes, &mut result);
            NetCDFData::Short(result)
        }
        NetCDFType::NC_INT => {
            let mut result = vec![0i32; count];
            BigEndian::read_i32_into(bytes, &mut result);
            NetCDFData::Int(result)
        }
        NetCDFType::NC_FLOAT => {
            let mut result = vec![0f32; count];
            BigEndian::read_f32_into(bytes, &mut result);
            NetCDFData::Float(result)
        }
        NetCDFType::NC_DOUBLE => {
            let mut result = vec![0f64; count];
            BigEndian::read_f64_into(bytes, &mut result);
            NetCDFData::Double(result)
        }
    }
}

/// Big endian bytes of `data`, without padding
pub fn encode(data: &NetCDFData) -> Vec<u8> {
    let mut result = vec![0u8; data.byte_len()];
    match data {
        NetCDFData::Byte(v) => {
            for (dst, src) in result.iter_mut().zip(v.iter()) {
                *dst = *src as u8;
            }
        }
        NetCDFData::Char(v) => result.copy_from_slice(v),
        NetCDFData::Short(v) => BigEndian::write_i16_into(v, &mut result),
        NetCDFData::Int(v) => BigEndian::write_i32_into(v, &mut result),
        NetCDFData::Float(v) => BigEndian::write_f32_into(v, &mut result),
        NetCDFData::Double(v) => BigEndian::write_f64_into(v, &mut result),
    }
    result
}

pub(crate) fn write_zeros<W: Write>(out: &mut W, count: u64) -> io::Result<u64> {
    io::copy(&mut io::repeat(0).take(count), out)
}

/// Write `count` fill values of `nc_type`
pub(crate) fn write_fill<W: Write>(
    out: &mut W,
    nc_type: NetCDFType,
    count: u64,
) -> io::Result<u64> {
    let pattern = nc_type.fill_bytes();
    let block: Vec<u8> = pattern.iter().cycle().take(pattern.len() * 1024).copied().collect();
    let mut remaining = count * pattern.len() as u64;
    while remaining > 0 {
        let n = remaining.min(block.len() as u64) as usize;
        out.write_all(&block[..n])?;
        remaining -= n as u64;
    }
    Ok(count * pattern.len() as u64)
}

/// Write `count` padding bytes cycling through the fill pattern of `nc_type`
pub(crate) fn write_fill_padding<W: Write>(
    out: &mut W,
    nc_type: NetCDFType,
    count: usize,
) -> io::Result<u64> {
    let pad: Vec<u8> = nc_type.fill_bytes().iter().cycle().take(count).copied().collect();
    out.write_all(&pad)?;
    Ok(count as u64)
}

fn write_name<W: Write>(out: &mut W, name: &str) -> io::Result<u64> {
    out.write_u32::<BigEndian>(name.len() as u32)?;
    out.write_all(name.as_bytes())?;
    let pad = write_zeros(out, padding(name.len()) as u64)?;
    Ok(4 + name.len() as u64 + pad)
}

fn write_list_header<W: Write>(out: &mut W, tag: u32, count: usize) -> io::Result<u64> {
    if count == 0 {
        // absent list
        out.write_u32::<BigEndian>(csts::ZERO)?;
        out.write_u32::<BigEndian>(csts::ZERO)?;
    } else {
        out.write_u32::<BigEndian>(tag)?;
        out.write_u32::<BigEndian>(count as u32)?;
    }
    Ok(8)
}

fn write_attribute_list<W: Write>(out: &mut W, attrs: &[NetCDFAttribute]) -> io::Result<u64> {
    let mut n = write_list_header(out, csts::NC_ATTRIBUTE, attrs.len())?;
    for attr in attrs {
        n += write_name(out, attr.name())?;
        out.write_u32::<BigEndian>(attr.nc_type().code())?;
        out.write_u32::<BigEndian>(attr.data().len() as u32)?;
        let bytes = encode(attr.data());
        out.write_all(&bytes)?;
        n += 8 + bytes.len() as u64 + write_zeros(out, padding(bytes.len()) as u64)?;
    }
    Ok(n)
}

/// Write the header of `dataset`, laid out by `layout`, with `numrecs`
/// records. Returns the number of bytes written, which excludes the reserved
/// space up to `layout.header_size`.
pub(crate) fn write_header<W: Write>(
    out: &mut W,
    dataset: &Dataset,
    layout: &Layout,
    numrecs: u64,
) -> io::Result<u64> {
    out.write_all(csts::MAGIC)?;
    out.write_u8(dataset.version().byte())?;
    let numrecs = if numrecs > csts::MAX_NUMRECS {
        csts::STREAMING
    } else {
        numrecs as u32
    };
    out.write_u32::<BigEndian>(numrecs)?;
    let mut n = 8;

    n += write_list_header(out, csts::NC_DIMENSION, dataset.dims().len())?;
    for dim in dataset.dims() {
        n += write_name(out, dim.name())?;
        out.write_u32::<BigEndian>(dim.size().unwrap_or(csts::ZERO))?;
        n += 4;
    }

    n += write_attribute_list(out, dataset.attrs())?;

    n += write_list_header(out, csts::NC_VARIABLE, dataset.vars().len())?;
    for (var, placement) in dataset.vars().iter().zip(layout.vars.iter()) {
        n += write_name(out, var.name())?;
        out.write_u32::<BigEndian>(var.dims().len() as u32)?;
        for id in var.dims() {
            out.write_u32::<BigEndian>(*id)?;
        }
        n += 4 + 4 * var.dims().len() as u64;
        n += write_attribute_list(out, var.attributes())?;
        out.write_u32::<BigEndian>(var.nc_type().code())?;
        out.write_u32::<BigEndian>(placement.vsize)?;
        n += 8;
        match dataset.version().offset_size() {
            4 => out.write_u32::<BigEndian>(placement.begin as u32)?,
            _ => out.write_u64::<BigEndian>(placement.begin)?,
        }
        n += dataset.version().offset_size() as u64;
    }
    Ok(n)
}
