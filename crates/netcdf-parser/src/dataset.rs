//! [`DatasetHandle`] implementation over a NetCDF file.

use std::path::Path;
use std::sync::Once;

use grid_common::{DatasetHandle, GridDims, GridError, GridResult, RawSlice};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};

/// Default fill for NC_FLOAT variables without an explicit `_FillValue`.
const NC_FILL_FLOAT: f32 = 9.969_21e36;
/// Default fill for NC_DOUBLE variables without an explicit `_FillValue`.
const NC_FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even when the Rust side handles the
/// error (e.g. probing for optional attributes). Safe to call repeatedly;
/// only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Names of the variables to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNames {
    pub data: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            data: "emission".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

/// Packing attributes of the data variable.
#[derive(Debug, Clone, Copy)]
struct Packing {
    scale_factor: f64,
    add_offset: f64,
}

/// An open NetCDF file exposing one data variable as a time×lat×lon grid.
///
/// The underlying file is closed when the dataset is dropped.
pub struct NetCdfDataset {
    file: netcdf::File,
    name: String,
    data_var: String,
    dims: GridDims,
    lat: Vec<f64>,
    lon: Vec<f64>,
    fill_value: Option<f64>,
    packing: Option<Packing>,
}

impl std::fmt::Debug for NetCdfDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfDataset")
            .field("name", &self.name)
            .field("data_var", &self.data_var)
            .field("dims", &self.dims)
            .field("fill_value", &self.fill_value)
            .field("packed", &self.packing.is_some())
            .finish()
    }
}

impl NetCdfDataset {
    /// Open `path` and validate the data and coordinate variables.
    pub fn open<P: AsRef<Path>>(path: P, names: &VariableNames) -> NetCdfResult<Self> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NetCdfError::MissingData(format!(
                    "file {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        }

        silence_hdf5_errors();

        let file = netcdf::open(path)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

        let lat = read_coordinate(&file, &names.latitude)?;
        let lon = read_coordinate(&file, &names.longitude)?;

        let var = file
            .variable(&names.data)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", names.data)))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if shape.len() != 3 {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} has {} dimensions, expected (time, lat, lon)",
                names.data,
                shape.len()
            )));
        }
        if shape[1] != lat.len() || shape[2] != lon.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} is {}x{} but coordinates are {}x{}",
                names.data,
                shape[1],
                shape[2],
                lat.len(),
                lon.len()
            )));
        }

        let fill_value = get_f64_attr(&var, "_FillValue").or_else(|| get_f64_attr(&var, "missing_value"));
        let scale_factor = get_f64_attr(&var, "scale_factor");
        let add_offset = get_f64_attr(&var, "add_offset");
        let packing = if scale_factor.is_some() || add_offset.is_some() {
            Some(Packing {
                scale_factor: scale_factor.unwrap_or(1.0),
                add_offset: add_offset.unwrap_or(0.0),
            })
        } else {
            None
        };

        let dims = GridDims::new(shape[0], shape[1], shape[2]);
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown.nc")
            .to_string();

        debug!(
            file = %name,
            variable = %names.data,
            time = dims.time,
            height = dims.height,
            width = dims.width,
            fill_value = ?fill_value,
            packed = packing.is_some(),
            "Opened NetCDF dataset"
        );

        drop(var);

        Ok(Self {
            file,
            name,
            data_var: names.data.clone(),
            dims,
            lat,
            lon,
            fill_value,
            packing,
        })
    }

    fn read_rows(&self, t: usize, stride: usize) -> NetCdfResult<Vec<f64>> {
        let var = self
            .file
            .variable(&self.data_var)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", self.data_var)))?;

        let out = self.dims.strided(stride);
        let mut values = Vec::with_capacity(out.cells());

        for y in (0..self.dims.height).step_by(stride) {
            let row: Vec<f64> = var.get_values((t, y, ..)).map_err(|e| {
                NetCdfError::InvalidFormat(format!(
                    "Failed to read {}[{}, {}, :]: {}",
                    self.data_var, t, y, e
                ))
            })?;
            if row.len() != self.dims.width {
                return Err(NetCdfError::InvalidFormat(format!(
                    "row {} of {} has {} values, expected {}",
                    y,
                    self.data_var,
                    row.len(),
                    self.dims.width
                )));
            }
            values.extend(row.iter().step_by(stride).copied());
        }

        Ok(values)
    }

    fn is_fill(&self, value: f64) -> bool {
        match self.fill_value {
            Some(fill) => value == fill,
            None => value == NC_FILL_DOUBLE || value == NC_FILL_FLOAT as f64,
        }
    }
}

impl DatasetHandle for NetCdfDataset {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn dims(&self) -> GridDims {
        self.dims
    }

    fn latitudes(&self) -> &[f64] {
        &self.lat
    }

    fn longitudes(&self) -> &[f64] {
        &self.lon
    }

    fn read_slice(&self, t: usize, stride: usize) -> GridResult<RawSlice> {
        if t >= self.dims.time {
            return Err(GridError::TimeOutOfRange {
                index: t,
                len: self.dims.time,
            });
        }

        let stride = stride.max(1);
        let out = self.dims.strided(stride);
        let mut values = self.read_rows(t, stride)?;

        match (self.packing, self.fill_value) {
            (None, Some(fill)) => Ok(RawSlice::WithFillValue {
                width: out.width,
                height: out.height,
                values,
                fill_value: Some(fill),
            }),
            (packing, _) => {
                let mask: Vec<bool> = values.iter().map(|&v| !self.is_fill(v)).collect();
                if let Some(p) = packing {
                    for v in values.iter_mut() {
                        *v = *v * p.scale_factor + p.add_offset;
                    }
                }
                Ok(RawSlice::WithValidityMask {
                    width: out.width,
                    height: out.height,
                    values,
                    mask,
                })
            }
        }
    }
}

fn read_coordinate(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
    var.get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}
