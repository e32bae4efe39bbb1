//! Read-only view of the dataset being cut

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::extents::Extent;

// external crates
use log::info;
use mdtools_lattice::Lattice;
use serde::{Deserialize, Serialize};

/// Special coordinate system of a multidimensional dataset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Not yet assigned
    #[default]
    None,
    /// Momentum transfer in the lab frame
    QLab,
    /// Momentum transfer in the sample frame
    QSample,
    /// Reciprocal lattice units (H, K, L)
    #[serde(rename = "HKL")]
    Hkl,
}

/// Everything a cut needs to know about its input dataset
///
/// Implemented by whatever holds the data. Dimension indices start at 0 and
/// must be below [MdDataset::num_dims()].
pub trait MdDataset {
    /// Number of dimensions, 3 for (H, K, L) and 4 with energy transfer
    fn num_dims(&self) -> usize;

    /// Coordinate system the dimensions are expressed in
    fn coordinate_system(&self) -> CoordinateSystem;

    /// Name of dimension `index`, e.g. `"[H,0,0]"`
    fn dimension_name(&self, index: usize) -> Result<String>;

    /// Current `(min, max)` of dimension `index`
    fn dimension_extent(&self, index: usize) -> Result<Extent>;

    /// Unit of dimension `index`, e.g. `"r.l.u."` or `"meV"`
    fn dimension_unit(&self, index: usize) -> Result<String>;

    /// Oriented lattice of the sample
    ///
    /// Fails with [Error::MissingLattice] if the dataset has none.
    fn lattice(&self) -> Result<Lattice>;
}

/// A single named dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: String,
}

impl Dimension {
    pub fn new(name: &str, min: f64, max: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            unit: unit.to_string(),
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.min, self.max)
    }
}

/// Plain description of a dataset
///
/// Useful where the real data lives elsewhere and only its metadata is to
/// hand, for example when planning cuts from a JSON description.
///
/// ```rust
/// # use mdtools_cut::{CoordinateSystem, DatasetInfo, MdDataset};
/// let json = r#"{
///     "coordinate_system": "HKL",
///     "dimensions": [
///         {"name": "[H,0,0]", "min": -1.0, "max": 1.0, "unit": "r.l.u."},
///         {"name": "[0,K,0]", "min": -1.0, "max": 1.0, "unit": "r.l.u."},
///         {"name": "[0,0,L]", "min": -1.0, "max": 1.0, "unit": "r.l.u."}
///     ],
///     "lattice": {"a": 5.0, "b": 5.0, "c": 5.0, "alpha": 90.0, "beta": 90.0, "gamma": 90.0}
/// }"#;
///
/// let dataset = DatasetInfo::from_json_str(json).unwrap();
/// assert_eq!(dataset.num_dims(), 3);
/// assert_eq!(dataset.coordinate_system(), CoordinateSystem::Hkl);
/// assert_eq!(dataset.lattice().unwrap().a(), 5.0);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub lattice: Option<Lattice>,
}

impl DatasetInfo {
    /// New dataset description
    pub fn new(
        coordinate_system: CoordinateSystem,
        dimensions: Vec<Dimension>,
        lattice: Option<Lattice>,
    ) -> Self {
        Self {
            coordinate_system,
            dimensions,
            lattice,
        }
    }

    /// Read a JSON dataset description
    ///
    /// ```rust, no_run
    /// # use mdtools_cut::DatasetInfo;
    /// let dataset = DatasetInfo::from_json_file("path/to/dataset.json").unwrap();
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path: &Path = Path::new(path.as_ref());
        info!("Reading dataset description from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a JSON dataset description
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn dimension(&self, index: usize) -> Result<&Dimension> {
        self.dimensions
            .get(index)
            .ok_or(Error::DimensionOutOfRange {
                index,
                ndims: self.dimensions.len(),
            })
    }
}

impl MdDataset for DatasetInfo {
    fn num_dims(&self) -> usize {
        self.dimensions.len()
    }

    fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    fn dimension_name(&self, index: usize) -> Result<String> {
        Ok(self.dimension(index)?.name.clone())
    }

    fn dimension_extent(&self, index: usize) -> Result<Extent> {
        Ok(self.dimension(index)?.extent())
    }

    fn dimension_unit(&self, index: usize) -> Result<String> {
        Ok(self.dimension(index)?.unit.clone())
    }

    fn lattice(&self) -> Result<Lattice> {
        self.lattice.ok_or(Error::MissingLattice)
    }
}
