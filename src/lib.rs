//! NetCDF classic - Reader and writer for NetCDF classic and 64-bit offset files
//!
//! Headers are parsed with streaming nom parsers ([`parser`]) into a
//! [`NetCDFHeader`]: the dataset definition, its record count and the offset
//! of every variable. Data is decoded on demand, from memory with a
//! [`DatasetView`] or from any `Read + Seek` source with [`NetCDF`].
//!
//! Files are written by a [`DatasetWriter`] from a [`Dataset`] assembled with
//! a [`DatasetBuilder`]. Variables or records left unset are written as the
//! default fill value of their type.
//!
//! ```
//! use ncclassic::{
//!     DatasetBuilder, DatasetView, DatasetWriter, NetCDFData, NetCDFType, NetCDFVersion,
//! };
//!
//! let mut builder = DatasetBuilder::new(NetCDFVersion::Classic);
//! builder
//!     .add_dim("latitude", 3)?
//!     .add_dim("longitude", 4)?
//!     .add_var("temperature", NetCDFType::NC_DOUBLE, &["latitude", "longitude"])?;
//! let mut writer = DatasetWriter::new(builder.build()?)?;
//! writer.put_var("temperature", (0..12i32).map(f64::from).collect::<Vec<f64>>())?;
//! let bytes = writer.to_bytes()?;
//!
//! let view = DatasetView::new(&bytes)?;
//! let offset = view.header().element_offset("temperature", &[1, 2])?;
//! assert_eq!(&bytes[offset as usize..offset as usize + 8], &6.0f64.to_be_bytes());
//! assert_eq!(view.read_var("temperature")?.get(6), Some(ncclassic::NetCDFValue::Double(6.0)));
//! # let _: NetCDFData = view.read_var("temperature")?;
//! # Ok::<(), ncclassic::Error>(())
//! ```

#[rustfmt::skip]
pub mod constants_and_types;
pub mod codec;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod parser;
pub mod reader;
pub mod writer;
mod utils;

pub use error::{Error, ErrorCategory, Result};
pub use model::{
    Dataset, DatasetBuilder, Layout, NetCDFAttribute, NetCDFData, NetCDFDimension, NetCDFHeader,
    NetCDFType, NetCDFValue, NetCDFVariable, NetCDFVersion, VariableRegion,
};
pub use reader::{DatasetView, NetCDF};
pub use utils::is_valid_name;
pub use writer::{DataPadding, DatasetWriter, WriterConfig};
