//! User facing description of a single cut

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::projection::ProjectionTable;

// external crates
use log::info;
use serde::{Deserialize, Serialize};

/// Everything a user supplies for one cut
///
/// Binning is given per dimension as 1 to 3 numbers, see
/// [BinDescriptor](crate::BinDescriptor). The fourth is only used for
/// datasets with an energy transfer dimension.
///
/// All fields are optional in JSON.
///
/// ```rust
/// # use mdtools_cut::CutRequest;
/// let request = CutRequest::from_json_str(r#"{
///     "p1_bin": [0.1],
///     "p2_bin": [-0.5, 0.5],
///     "p3_bin": [-0.5, 0.5],
///     "no_pix": true
/// }"#).unwrap();
///
/// assert!(request.projection.is_none());
/// assert!(request.check_axes);
/// assert!(request.p4_bin.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutRequest {
    /// Optional projection table, identity if missing
    pub projection: Option<ProjectionTable>,
    /// Binning of the first cut axis
    pub p1_bin: Vec<f64>,
    /// Binning of the second cut axis
    pub p2_bin: Vec<f64>,
    /// Binning of the third cut axis
    pub p3_bin: Vec<f64>,
    /// Binning of the energy axis
    pub p4_bin: Vec<f64>,
    /// Histogram output only, dropping individual events
    pub no_pix: bool,
    /// Check that the input dimensions are ordered H, K, L
    pub check_axes: bool,
}

impl Default for CutRequest {
    fn default() -> Self {
        Self {
            projection: None,
            p1_bin: Vec::new(),
            p2_bin: Vec::new(),
            p3_bin: Vec::new(),
            p4_bin: Vec::new(),
            no_pix: false,
            check_axes: true,
        }
    }
}

impl CutRequest {
    /// Request with binning for the three spatial axes
    pub fn new(p1_bin: &[f64], p2_bin: &[f64], p3_bin: &[f64]) -> Self {
        Self {
            p1_bin: p1_bin.to_vec(),
            p2_bin: p2_bin.to_vec(),
            p3_bin: p3_bin.to_vec(),
            ..Default::default()
        }
    }

    /// Builder for the projection table
    pub fn with_projection(mut self, projection: ProjectionTable) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Builder for the energy axis binning
    pub fn with_energy_bin(mut self, p4_bin: &[f64]) -> Self {
        self.p4_bin = p4_bin.to_vec();
        self
    }

    /// Builder for histogram only output
    pub fn with_no_pix(mut self, no_pix: bool) -> Self {
        self.no_pix = no_pix;
        self
    }

    /// Builder for the axis order check
    pub fn with_check_axes(mut self, check_axes: bool) -> Self {
        self.check_axes = check_axes;
        self
    }

    /// Binning values of all four dimensions in order
    pub fn bins(&self) -> [&[f64]; 4] {
        [
            self.p1_bin.as_slice(),
            self.p2_bin.as_slice(),
            self.p3_bin.as_slice(),
            self.p4_bin.as_slice(),
        ]
    }

    /// Read a JSON cut request
    ///
    /// ```rust, no_run
    /// # use mdtools_cut::CutRequest;
    /// let request = CutRequest::from_json_file("path/to/cut.json").unwrap();
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path: &Path = Path::new(path.as_ref());
        info!("Reading cut request from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a JSON cut request
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
