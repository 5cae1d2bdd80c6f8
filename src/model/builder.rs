use super::{
    Dataset, NetCDFAttribute, NetCDFData, NetCDFDimension, NetCDFType, NetCDFVariable,
    NetCDFVersion,
};
use crate::constants_and_types as csts;
use crate::error::{Error, Namespace, Result};
use crate::utils::is_valid_name;

/// Accumulates dimensions, attributes and variables, checking each
/// declaration as it is added.
///
/// ```
/// use ncclassic::{DatasetBuilder, NetCDFType, NetCDFVersion};
///
/// let mut builder = DatasetBuilder::new(NetCDFVersion::Classic);
/// builder
///     .add_dim("latitude", 3)?
///     .add_unlimited_dim("time")?
///     .add_global_attr("title", "example")?
///     .add_var("temperature", NetCDFType::NC_DOUBLE, &["time", "latitude"])?
///     .add_var_attr("temperature", "units", "Celsius")?;
/// let dataset = builder.build()?;
/// assert_eq!(dataset.vars().len(), 1);
/// # Ok::<(), ncclassic::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    version: NetCDFVersion,
    dims: Vec<NetCDFDimension>,
    attrs: Vec<NetCDFAttribute>,
    vars: Vec<NetCDFVariable>,
}

impl DatasetBuilder {
    pub fn new(version: NetCDFVersion) -> Self {
        DatasetBuilder {
            version,
            dims: Vec::new(),
            attrs: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// Declare a fixed-size dimension, `size` in `1..=i32::MAX`
    pub fn add_dim(&mut self, name: &str, size: u32) -> Result<&mut Self> {
        if size == 0 || size > csts::MAX_DIM_SIZE {
            return Err(Error::InvalidDimensionSize {
                name: name.to_string(),
                size,
            });
        }
        self.push_dim(name, Some(size))
    }

    /// Declare the unlimited (record) dimension
    pub fn add_unlimited_dim(&mut self, name: &str) -> Result<&mut Self> {
        if let Some(first) = self.dims.iter().find(|d| d.is_unlimited()) {
            return Err(Error::MultipleUnlimitedDimensions {
                first: first.name().to_string(),
                second: name.to_string(),
            });
        }
        self.push_dim(name, None)
    }

    fn push_dim(&mut self, name: &str, size: Option<u32>) -> Result<&mut Self> {
        check_new_name(name, Namespace::Dimension, self.dims.iter().map(|d| d.name()))?;
        self.dims.push(NetCDFDimension::new(name.to_string(), size));
        Ok(self)
    }

    pub fn add_global_attr<D: Into<NetCDFData>>(
        &mut self,
        name: &str,
        data: D,
    ) -> Result<&mut Self> {
        check_new_name(name, Namespace::Attribute, self.attrs.iter().map(|a| a.name()))?;
        self.attrs
            .push(NetCDFAttribute::new(name.to_string(), data.into()));
        Ok(self)
    }

    /// Declare a variable over already declared dimensions, outermost first.
    /// No dimensions declares a scalar.
    pub fn add_var(
        &mut self,
        name: &str,
        nc_type: NetCDFType,
        dims: &[&str],
    ) -> Result<&mut Self> {
        check_new_name(name, Namespace::Variable, self.vars.iter().map(|v| v.name()))?;
        let mut ids = Vec::with_capacity(dims.len());
        for (position, dim_name) in dims.iter().enumerate() {
            let (id, dim) = self
                .dims
                .iter()
                .enumerate()
                .find(|(_, d)| d.name() == *dim_name)
                .ok_or_else(|| Error::UnknownDimension {
                    var: name.to_string(),
                    dim: dim_name.to_string(),
                })?;
            if dim.is_unlimited() && position > 0 {
                return Err(Error::UnlimitedNotOutermost {
                    var: name.to_string(),
                    dim: dim_name.to_string(),
                });
            }
            ids.push(id as u32);
        }
        self.vars
            .push(NetCDFVariable::new(name.to_string(), ids, Vec::new(), nc_type));
        Ok(self)
    }

    pub fn add_var_attr<D: Into<NetCDFData>>(
        &mut self,
        var: &str,
        name: &str,
        data: D,
    ) -> Result<&mut Self> {
        let variable = self
            .vars
            .iter_mut()
            .find(|v| v.name == var)
            .ok_or_else(|| Error::UnknownVariable(var.to_string()))?;
        check_new_name(
            name,
            Namespace::Attribute,
            variable.attributes.iter().map(|a| a.name()),
        )?;
        variable
            .attributes
            .push(NetCDFAttribute::new(name.to_string(), data.into()));
        Ok(self)
    }

    /// Rename a dimension. Variables refer to dimensions by index, so they
    /// follow the new name.
    pub fn rename_dim(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        if old == new {
            return Ok(self);
        }
        let index = self.dim_index(old)?;
        check_new_name(new, Namespace::Dimension, self.dims.iter().map(|d| d.name()))?;
        self.dims[index].name = new.to_string();
        Ok(self)
    }

    /// Remove a dimension no variable uses. Ids of the dimensions declared
    /// after it shift down by one.
    pub fn remove_dim(&mut self, name: &str) -> Result<NetCDFDimension> {
        let index = self.dim_index(name)?;
        let users: Vec<String> = self
            .vars
            .iter()
            .filter(|v| v.dims.contains(&(index as u32)))
            .map(|v| v.name.clone())
            .collect();
        if !users.is_empty() {
            return Err(Error::DimensionInUse {
                dim: name.to_string(),
                vars: users,
            });
        }
        for var in self.vars.iter_mut() {
            for id in var.dims.iter_mut() {
                if *id as usize > index {
                    *id -= 1;
                }
            }
        }
        Ok(self.dims.remove(index))
    }

    pub fn rename_var(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        if old == new {
            return Ok(self);
        }
        let index = self.var_index(old)?;
        check_new_name(new, Namespace::Variable, self.vars.iter().map(|v| v.name()))?;
        self.vars[index].name = new.to_string();
        Ok(self)
    }

    pub fn remove_var(&mut self, name: &str) -> Result<NetCDFVariable> {
        let index = self.var_index(name)?;
        Ok(self.vars.remove(index))
    }

    pub fn rename_global_attr(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        rename_attr(&mut self.attrs, old, new)?;
        Ok(self)
    }

    pub fn remove_global_attr(&mut self, name: &str) -> Result<NetCDFAttribute> {
        remove_attr(&mut self.attrs, name)
    }

    pub fn rename_var_attr(&mut self, var: &str, old: &str, new: &str) -> Result<&mut Self> {
        let index = self.var_index(var)?;
        rename_attr(&mut self.vars[index].attributes, old, new)?;
        Ok(self)
    }

    pub fn remove_var_attr(&mut self, var: &str, name: &str) -> Result<NetCDFAttribute> {
        let index = self.var_index(var)?;
        remove_attr(&mut self.vars[index].attributes, name)
    }

    fn dim_index(&self, name: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d.name() == name)
            .ok_or_else(|| Error::UndefinedDimension(name.to_string()))
    }

    fn var_index(&self, name: &str) -> Result<usize> {
        self.vars
            .iter()
            .position(|v| v.name() == name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    pub fn build(self) -> Result<Dataset> {
        Dataset::new(self.version, self.dims, self.attrs, self.vars)
    }
}

/// Start from an existing definition, typically one read from a file
impl From<Dataset> for DatasetBuilder {
    fn from(dataset: Dataset) -> Self {
        DatasetBuilder {
            version: dataset.version,
            dims: dataset.dims,
            attrs: dataset.attrs,
            vars: dataset.vars,
        }
    }
}

fn rename_attr(attrs: &mut [NetCDFAttribute], old: &str, new: &str) -> Result<()> {
    if old == new {
        return Ok(());
    }
    let index = attrs
        .iter()
        .position(|a| a.name() == old)
        .ok_or_else(|| Error::UnknownAttribute(old.to_string()))?;
    check_new_name(new, Namespace::Attribute, attrs.iter().map(|a| a.name()))?;
    attrs[index].name = new.to_string();
    Ok(())
}

fn remove_attr(attrs: &mut Vec<NetCDFAttribute>, name: &str) -> Result<NetCDFAttribute> {
    let index = attrs
        .iter()
        .position(|a| a.name() == name)
        .ok_or_else(|| Error::UnknownAttribute(name.to_string()))?;
    Ok(attrs.remove(index))
}

fn check_new_name<'a, I: Iterator<Item = &'a str>>(
    name: &str,
    namespace: Namespace,
    mut existing: I,
) -> Result<()> {
    if !is_valid_name(name) {
        return Err(Error::InvalidName(name.to_string()));
    }
    if existing.any(|n| n == name) {
        return Err(Error::DuplicateName {
            namespace,
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_second_unlimited_dimension() {
        let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
        b.add_unlimited_dim("time").unwrap();
        let err = b.add_unlimited_dim("other").unwrap_err();
        match err {
            Error::MultipleUnlimitedDimensions { first, second } => {
                assert_eq!(first, "time");
                assert_eq!(second, "other");
            }
            _ => panic!("Unexpected error: {:?}", err),
        }
    }

    #[test]
    fn rejects_duplicates() {
        let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
        b.add_dim("x", 2).unwrap();
        assert!(matches!(
            b.add_dim("x", 3).unwrap_err(),
            Error::DuplicateName {
                namespace: Namespace::Dimension,
                ..
            }
        ));
        b.add_var("x", NetCDFType::NC_INT, &["x"]).unwrap();
        assert!(matches!(
            b.add_var("x", NetCDFType::NC_INT, &[]).unwrap_err(),
            Error::DuplicateName {
                namespace: Namespace::Variable,
                ..
            }
        ));
        b.add_var_attr("x", "units", "m").unwrap();
        assert!(matches!(
            b.add_var_attr("x", "units", "km").unwrap_err(),
            Error::DuplicateName {
                namespace: Namespace::Attribute,
                ..
            }
        ));
        // same attribute name on the dataset itself is fine
        b.add_global_attr("units", "m").unwrap();
    }

    #[test]
    fn rejects_bad_declarations() {
        let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
        assert!(matches!(
            b.add_dim("zero", 0).unwrap_err(),
            Error::InvalidDimensionSize { size: 0, .. }
        ));
        assert!(matches!(
            b.add_dim("", 1).unwrap_err(),
            Error::InvalidName(_)
        ));
        assert!(matches!(
            b.add_var("v", NetCDFType::NC_INT, &["missing"]).unwrap_err(),
            Error::UnknownDimension { .. }
        ));
        b.add_dim("x", 2).unwrap();
        b.add_unlimited_dim("time").unwrap();
        assert!(matches!(
            b.add_var("v", NetCDFType::NC_INT, &["x", "time"]).unwrap_err(),
            Error::UnlimitedNotOutermost { .. }
        ));
        assert!(matches!(
            b.add_var_attr("v", "units", "m").unwrap_err(),
            Error::UnknownVariable(_)
        ));
    }

    #[test]
    fn keeps_declaration_order() {
        let mut b = DatasetBuilder::new(NetCDFVersion::Offset64);
        b.add_dim("b", 1).unwrap();
        b.add_dim("a", 2).unwrap();
        b.add_var("second", NetCDFType::NC_CHAR, &["a", "b"]).unwrap();
        b.add_var("first", NetCDFType::NC_CHAR, &["b"]).unwrap();
        let ds = b.build().unwrap();
        assert_eq!(ds.version(), NetCDFVersion::Offset64);
        let names: Vec<&str> = ds.dims().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(ds.vars()[0].dims(), &[1, 0]);
        assert_eq!(ds.var_index("first"), Some(1));
    }

    fn edited() -> DatasetBuilder {
        let mut b = DatasetBuilder::new(NetCDFVersion::Classic);
        b.add_dim("unused", 7).unwrap();
        b.add_unlimited_dim("time").unwrap();
        b.add_dim("x", 2).unwrap();
        b.add_global_attr("title", "t").unwrap();
        b.add_var("v", NetCDFType::NC_INT, &["time", "x"]).unwrap();
        b.add_var_attr("v", "units", "m").unwrap();
        b.add_var("w", NetCDFType::NC_BYTE, &["x"]).unwrap();
        b
    }

    #[test]
    fn remove_dim_shifts_ids() {
        let mut b = edited();
        match b.remove_dim("x").unwrap_err() {
            Error::DimensionInUse { dim, vars } => {
                assert_eq!(dim, "x");
                assert_eq!(vars, vec!["v".to_string(), "w".to_string()]);
            }
            e => panic!("Unexpected error: {:?}", e),
        }
        let removed = b.remove_dim("unused").unwrap();
        assert_eq!(removed.size(), Some(7));
        assert!(matches!(
            b.remove_dim("unused").unwrap_err(),
            Error::UndefinedDimension(_)
        ));
        let ds = b.build().unwrap();
        assert_eq!(ds.vars()[0].dims(), &[0, 1]);
        assert_eq!(ds.vars()[1].dims(), &[1]);
        assert!(ds.is_record_var(&ds.vars()[0]));
        assert_eq!(ds.chunk_len(&ds.vars()[0]), Some(2));
    }

    #[test]
    fn rename_keeps_references() {
        let mut b = edited();
        b.rename_dim("x", "station").unwrap();
        b.rename_dim("time", "time").unwrap();
        assert!(matches!(
            b.rename_dim("station", "time").unwrap_err(),
            Error::DuplicateName {
                namespace: Namespace::Dimension,
                ..
            }
        ));
        assert!(matches!(
            b.rename_dim("station", "bad/name").unwrap_err(),
            Error::InvalidName(_)
        ));
        b.rename_var("v", "speed").unwrap();
        assert!(matches!(
            b.rename_var("speed", "w").unwrap_err(),
            Error::DuplicateName {
                namespace: Namespace::Variable,
                ..
            }
        ));
        b.rename_var_attr("speed", "units", "unit").unwrap();
        b.rename_global_attr("title", "name").unwrap();
        assert!(matches!(
            b.rename_global_attr("title", "other").unwrap_err(),
            Error::UnknownAttribute(_)
        ));

        let ds = b.build().unwrap();
        let speed = ds.var("speed").unwrap();
        assert_eq!(ds.dims()[speed.dims()[1] as usize].name(), "station");
        assert!(speed.attribute("unit").is_some());
        assert!(ds.attr("name").is_some());
    }

    #[test]
    fn remove_variables_and_attributes() {
        let mut b = edited();
        let attr = b.remove_var_attr("v", "units").unwrap();
        assert_eq!(attr.data().as_str(), Some("m"));
        assert!(matches!(
            b.remove_var_attr("v", "units").unwrap_err(),
            Error::UnknownAttribute(_)
        ));
        assert!(matches!(
            b.remove_var_attr("nope", "units").unwrap_err(),
            Error::UnknownVariable(_)
        ));
        b.remove_global_attr("title").unwrap();
        let v = b.remove_var("v").unwrap();
        assert_eq!(v.nc_type(), NetCDFType::NC_INT);
        b.remove_var("w").unwrap();
        // dimensions are free once their variables are gone
        b.remove_dim("x").unwrap();
        let ds = b.build().unwrap();
        assert!(ds.vars().is_empty());
        assert!(ds.attrs().is_empty());
        assert_eq!(ds.dims().len(), 2);
    }

    #[test]
    fn edits_a_built_dataset() {
        let ds = edited().build().unwrap();
        let mut b = DatasetBuilder::from(ds.clone());
        b.rename_var("w", "mask").unwrap();
        let renamed = b.build().unwrap();
        assert_eq!(renamed.vars()[1].name(), "mask");
        assert_eq!(renamed.dims(), ds.dims());
    }
}
