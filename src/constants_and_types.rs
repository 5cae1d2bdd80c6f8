//! Constants and Types
#![allow(non_camel_case_types)]

// Constants
pub const MAGIC:        &[u8; 3] = b"CDF";
pub const STREAMING:    u32 = 0xFF_FF_FF_FF;
pub const ZERO:         u32 = 0x00_00_00_00;

pub const NC_DIMENSION: u32 = 0x00_00_00_0A;
pub const NC_VARIABLE:  u32 = 0x00_00_00_0B;
pub const NC_ATTRIBUTE: u32 = 0x00_00_00_0C;

pub const NC_BYTE:      u32 = 0x00_00_00_01;
pub const NC_CHAR:      u32 = 0x00_00_00_02;
pub const NC_SHORT:     u32 = 0x00_00_00_03;
pub const NC_INT:       u32 = 0x00_00_00_04;
pub const NC_FLOAT:     u32 = 0x00_00_00_05;
pub const NC_DOUBLE:    u32 = 0x00_00_00_06;

// Default fill values (`NC_FILL_*` in netcdf.h)
pub const NC_FILL_BYTE:   i8  = -127;
pub const NC_FILL_CHAR:   u8  = 0;
pub const NC_FILL_SHORT:  i16 = -32767;
pub const NC_FILL_INT:    i32 = -2147483647;
pub const NC_FILL_FLOAT:  f32 = 9.9692099683868690e+36;
pub const NC_FILL_DOUBLE: f64 = 9.9692099683868690e+36;

// Big endian encodings of the fill values above
pub const FILL_BYTES_BYTE:   [u8; 1] = [0x81];
pub const FILL_BYTES_CHAR:   [u8; 1] = [0x00];
pub const FILL_BYTES_SHORT:  [u8; 2] = [0x80, 0x01];
pub const FILL_BYTES_INT:    [u8; 4] = [0x80, 0x00, 0x00, 0x01];
pub const FILL_BYTES_FLOAT:  [u8; 4] = [0x7C, 0xF0, 0x00, 0x00];
pub const FILL_BYTES_DOUBLE: [u8; 8] = [0x47, 0x9E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

// Limits
pub const ALIGNMENT:          usize = 4;
pub const NC_MAX_NAME:        usize = 256;
pub const MAX_DIM_SIZE:       u32   = i32::MAX as u32;
pub const CLASSIC_MAX_OFFSET: u64   = i32::MAX as u64;
pub const MAX_VSIZE:          u64   = i32::MAX as u64;
pub const MAX_NUMRECS:        u64   = i32::MAX as u64;

// Types
pub type NON_NEG = u32;
