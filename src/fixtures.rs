//! Reference files exercising the edge cases of the format
//!
//! Each [`Fixture`] builds a complete [`DatasetWriter`]: dimensions,
//! attributes, variables and data. [`generate`] writes them to a directory.
use crate::error::{Error, Result};
use crate::model::{DatasetBuilder, NetCDFType, NetCDFVersion};
use crate::writer::DatasetWriter;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// One named reference file
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub file_name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Result<DatasetWriter>,
}

impl Fixture {
    /// File name without the `.nc` extension
    pub fn name(&self) -> &'static str {
        self.file_name.trim_end_matches(".nc")
    }
}

pub static FIXTURES: &[Fixture] = &[
    Fixture {
        file_name: "empty_data_set.nc",
        description: "no dimensions, attributes or variables",
        build: empty_data_set,
    },
    Fixture {
        file_name: "temp_3D_classic.nc",
        description: "temperatures of every type over (time, latitude, longitude), classic format",
        build: temp_3d_classic,
    },
    Fixture {
        file_name: "temp_3D_64bit_offset.nc",
        description: "temperatures of every type over (time, latitude, longitude), 64-bit offsets",
        build: temp_3d_64bit_offset,
    },
    Fixture {
        file_name: "nc_fill_values.nc",
        description: "scalar variables of every type left to their default fill value",
        build: nc_fill_values,
    },
    Fixture {
        file_name: "scalar_vars.nc",
        description: "scalar variables of every type set to 42",
        build: scalar_vars,
    },
    Fixture {
        file_name: "temp_3D_classic_light.nc",
        description: "a 3x4 temperature grid with its coordinate variables",
        build: temp_3d_classic_light,
    },
    Fixture {
        file_name: "zero_sized_unlimited_dim.nc",
        description: "an unlimited dimension without any record",
        build: zero_sized_unlimited_dim,
    },
    Fixture {
        file_name: "containing_default_fill_values.nc",
        description: "record variables of every type with an unset middle record",
        build: containing_default_fill_values,
    },
];

/// Look a fixture up by file name, with or without extension
pub fn find(name: &str) -> Option<&'static Fixture> {
    FIXTURES
        .iter()
        .find(|f| f.file_name == name || f.name() == name)
}

/// Write the fixtures named in `only` (all of them if empty) into `dir`,
/// returning the written paths. A file that fails half way is removed.
pub fn generate<P: AsRef<Path>>(dir: P, only: &[&str]) -> Result<Vec<PathBuf>> {
    let selected: Vec<&Fixture> = if only.is_empty() {
        FIXTURES.iter().collect()
    } else {
        only.iter()
            .map(|name| find(name).ok_or_else(|| Error::UnknownFixture(name.to_string())))
            .collect::<Result<_>>()?
    };
    fs::create_dir_all(dir.as_ref())?;

    let mut written = Vec::with_capacity(selected.len());
    for fixture in selected {
        let path = dir.as_ref().join(fixture.file_name);
        match (fixture.build)().and_then(|writer| writer.write_file(&path)) {
            Ok(n) => info!("wrote {} ({} bytes)", path.display(), n),
            Err(e) => {
                if path.exists() {
                    if let Err(cleanup) = fs::remove_file(&path) {
                        warn!("could not remove {}: {}", path.display(), cleanup);
                    }
                }
                return Err(e);
            }
        }
        written.push(path);
    }
    Ok(written)
}

fn empty_data_set() -> Result<DatasetWriter> {
    DatasetWriter::new(DatasetBuilder::new(NetCDFVersion::Classic).build()?)
}

const TEMPERATURE_ATTRS: [(&str, &str); 3] = [
    ("standard_name", "air_temperature"),
    ("long_name", "TEMPERATURE"),
    ("units", "Celsius"),
];

fn temperatures(version: NetCDFVersion, title: &str) -> Result<DatasetWriter> {
    let mut b = DatasetBuilder::new(version);
    b.add_global_attr("title", title)?
        .add_global_attr("Conventions", "CF-1.8")?;
    b.add_dim("latitude", 3)?
        .add_dim("longitude", 5)?
        .add_unlimited_dim("time")?;

    b.add_var("latitude", NetCDFType::NC_FLOAT, &["latitude"])?
        .add_var_attr("latitude", "standard_name", "latitude")?
        .add_var_attr("latitude", "long_name", "LATITUDE")?
        .add_var_attr("latitude", "units", "degrees_north")?
        .add_var_attr("latitude", "axis", "Y")?;
    b.add_var("longitude", NetCDFType::NC_FLOAT, &["longitude"])?
        .add_var_attr("longitude", "standard_name", "longitude")?
        .add_var_attr("longitude", "long_name", "LONGITUDE")?
        .add_var_attr("longitude", "units", "degrees_east")?
        .add_var_attr("longitude", "axis", "X")?;
    b.add_var("time", NetCDFType::NC_FLOAT, &["time"])?
        .add_var_attr("time", "standard_name", "time")?
        .add_var_attr("time", "long_name", "TIME")?
        .add_var_attr("time", "units", "hours since 1970-01-01 00:00:00")?
        .add_var_attr("time", "calendar", "gregorian")?
        .add_var_attr("time", "axis", "T")?;

    let temperatures = [
        ("temperature_i8", NetCDFType::NC_BYTE),
        ("temperature_u8", NetCDFType::NC_CHAR),
        ("temperature_i16", NetCDFType::NC_SHORT),
        ("temperature_i32", NetCDFType::NC_INT),
        ("temperature_f32", NetCDFType::NC_FLOAT),
        ("temperature_f64", NetCDFType::NC_DOUBLE),
    ];
    for (name, nc_type) in temperatures.iter() {
        b.add_var(name, *nc_type, &["time", "latitude", "longitude"])?;
        for (attr, value) in TEMPERATURE_ATTRS.iter() {
            b.add_var_attr(name, attr, *value)?;
        }
    }

    let mut writer = DatasetWriter::new(b.build()?)?;
    writer.put_var("latitude", vec![0.0f32, 0.5, 1.0])?;
    writer.put_var("longitude", vec![0.0f32, 0.5, 1.0, 1.5, 2.0])?;
    writer.put_var("time", vec![438_300.0f32, 438_324.0])?;
    writer.put_var("temperature_i8", (0..30).collect::<Vec<i8>>())?;
    writer.put_var("temperature_u8", (0..30).collect::<Vec<u8>>())?;
    writer.put_var("temperature_i16", (0..30).collect::<Vec<i16>>())?;
    writer.put_var("temperature_i32", (0..30).collect::<Vec<i32>>())?;
    writer.put_var("temperature_f32", (0..30).map(|v| v as f32).collect::<Vec<f32>>())?;
    writer.put_var("temperature_f64", (0..30i32).map(f64::from).collect::<Vec<f64>>())?;
    Ok(writer)
}

fn temp_3d_classic() -> Result<DatasetWriter> {
    temperatures(NetCDFVersion::Classic, "Example of NETCDF3_CLASSIC file")
}

fn temp_3d_64bit_offset() -> Result<DatasetWriter> {
    temperatures(NetCDFVersion::Offset64, "Example of NETCDF3_64BIT_OFFSET file")
}

const SCALAR_TYPES: [(&str, NetCDFType); 6] = [
    ("i8", NetCDFType::NC_BYTE),
    ("u8", NetCDFType::NC_CHAR),
    ("i16", NetCDFType::NC_SHORT),
    ("i32", NetCDFType::NC_INT),
    ("f32", NetCDFType::NC_FLOAT),
    ("f64", NetCDFType::NC_DOUBLE),
];

fn nc_fill_values() -> Result<DatasetWriter> {
    let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
    for (suffix, nc_type) in SCALAR_TYPES.iter() {
        b.add_var(&format!("nc_fill_value_{}", suffix), *nc_type, &[])?;
    }
    DatasetWriter::new(b.build()?)
}

fn scalar_vars() -> Result<DatasetWriter> {
    let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
    for (suffix, nc_type) in SCALAR_TYPES.iter() {
        b.add_var(&format!("scalar_value_{}", suffix), *nc_type, &[])?;
    }
    let mut writer = DatasetWriter::new(b.build()?)?;
    writer.put_var("scalar_value_i8", vec![42i8])?;
    writer.put_var("scalar_value_u8", vec![42u8])?;
    writer.put_var("scalar_value_i16", vec![42i16])?;
    writer.put_var("scalar_value_i32", vec![42i32])?;
    writer.put_var("scalar_value_f32", vec![42.0f32])?;
    writer.put_var("scalar_value_f64", vec![42.0f64])?;
    Ok(writer)
}

fn temp_3d_classic_light() -> Result<DatasetWriter> {
    let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
    b.add_dim("latitude", 3)?.add_dim("longitude", 4)?;
    b.add_var("latitude", NetCDFType::NC_FLOAT, &["latitude"])?
        .add_var("longitude", NetCDFType::NC_FLOAT, &["longitude"])?
        .add_var("temperature", NetCDFType::NC_DOUBLE, &["latitude", "longitude"])?;
    let mut writer = DatasetWriter::new(b.build()?)?;
    writer.put_var("latitude", vec![0.0f32, 1.0, 2.0])?;
    writer.put_var("longitude", vec![0.0f32, 1.0, 2.0, 3.0])?;
    writer.put_var("temperature", (0..12i32).map(f64::from).collect::<Vec<f64>>())?;
    Ok(writer)
}

fn zero_sized_unlimited_dim() -> Result<DatasetWriter> {
    let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
    b.add_unlimited_dim("unlim_dim")?;
    DatasetWriter::new(b.build()?)
}

fn containing_default_fill_values() -> Result<DatasetWriter> {
    const DIM: &str = "dimension_0";
    let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
    b.add_unlimited_dim(DIM)?;
    b.add_var(DIM, NetCDFType::NC_INT, &[DIM])?;
    for (suffix, nc_type) in SCALAR_TYPES.iter() {
        b.add_var(&format!("var_{}", suffix), *nc_type, &[DIM])?;
    }
    let mut writer = DatasetWriter::new(b.build()?)?;
    writer.put_var(DIM, vec![1i32, 2, 3])?;
    // record 1 stays unset
    for record in [0u64, 2].iter() {
        let value = *record as i8 + 1;
        writer.put_record("var_i8", *record, vec![value])?;
        writer.put_record("var_u8", *record, vec![value as u8])?;
        writer.put_record("var_i16", *record, vec![i16::from(value)])?;
        writer.put_record("var_i32", *record, vec![i32::from(value)])?;
        writer.put_record("var_f32", *record, vec![f32::from(value)])?;
        writer.put_record("var_f64", *record, vec![f64::from(value)])?;
    }
    Ok(writer)
}
