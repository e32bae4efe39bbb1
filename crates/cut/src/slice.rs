//! Hand-off of a [CutPlan] to the slicing executor
//!
//! The executor that actually re-bins events lives outside this crate. It
//! receives a [SliceRequest] and returns an output that can be annotated
//! with the projection through [OutputMetadata].

// crate modules
use crate::dataset::MdDataset;
use crate::error::Result;
use crate::plan::{CutPlan, OutputMode};
use crate::request::CutRequest;

// mdtools modules
use mdtools_utils::f;

// external crates
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Metadata key for the flattened projection matrix
pub const W_MATRIX: &str = "W_MATRIX";

/// A named output axis as a combination of the input dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisVector {
    pub name: String,
    pub unit: String,
    pub components: Vec<f64>,
}

impl std::fmt::Display for BasisVector {
    /// Written as `"name, unit, c0,c1,c2"`
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let components = self
            .components
            .iter()
            .map(|c| f!("{c:?}"))
            .collect::<Vec<String>>()
            .join(",");
        write!(f, "{}, {}, {}", self.name, self.unit, components)
    }
}

/// Everything the slicing executor needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceRequest {
    /// `"SliceMD"` for event output, `"BinMD"` for histograms
    pub algorithm: String,
    pub normalize_basis_vectors: bool,
    pub axis_aligned: bool,
    /// One per output dimension
    pub basis_vectors: Vec<BasisVector>,
    /// Flattened `[min0, max0, min1, max1, ...]`
    pub output_extents: Vec<f64>,
    pub output_bins: Vec<usize>,
}

impl SliceRequest {
    /// Output mode matching the requested algorithm
    pub fn mode(&self) -> OutputMode {
        match self.algorithm.as_str() {
            "BinMD" => OutputMode::Histogram,
            _ => OutputMode::Events,
        }
    }
}

impl CutPlan {
    /// Parameters for the slicing executor
    ///
    /// Basis vectors use the projection as given by the user, while the
    /// extents come from the unit scaled frame. For 4-D cuts every spatial
    /// vector gains a trailing 0 and the energy axis maps onto itself.
    ///
    /// ```rust
    /// # use mdtools_cut::{CoordinateSystem, CutPlan, CutRequest, DatasetInfo, Dimension};
    /// # let dataset = DatasetInfo::new(
    /// #     CoordinateSystem::Hkl,
    /// #     vec![
    /// #         Dimension::new("H", -1.0, 1.0, "r.l.u."),
    /// #         Dimension::new("K", -1.0, 1.0, "r.l.u."),
    /// #         Dimension::new("L", -1.0, 1.0, "r.l.u."),
    /// #     ],
    /// #     None,
    /// # );
    /// let request = CutRequest::new(&[0.5], &[2.0], &[2.0]).with_no_pix(true);
    /// let slice = CutPlan::build(&dataset, &request).unwrap().slice_request();
    ///
    /// assert_eq!(slice.algorithm, "BinMD");
    /// assert_eq!(slice.basis_vectors[0].to_string(), "[zeta, 0, 0], r, 1.0,0.0,0.0");
    /// assert_eq!(slice.output_bins, vec![4, 1, 1]);
    /// ```
    pub fn slice_request(&self) -> SliceRequest {
        let four_d = self.energy().is_some();

        let mut basis_vectors = self
            .projection()
            .axes()
            .iter()
            .zip(self.labels().iter().zip(self.units().iter()))
            .map(|(axis, (label, unit))| {
                let mut components = axis.to_vec();
                if four_d {
                    components.push(0.0);
                }
                BasisVector {
                    name: label.clone(),
                    unit: unit.to_string(),
                    components,
                }
            })
            .collect::<Vec<BasisVector>>();

        if let Some(energy) = self.energy() {
            basis_vectors.push(BasisVector {
                name: energy.name.clone(),
                unit: energy.unit.clone(),
                components: vec![0.0, 0.0, 0.0, 1.0],
            });
        }

        let request = SliceRequest {
            algorithm: self.mode().algorithm_name().to_string(),
            normalize_basis_vectors: false,
            axis_aligned: false,
            basis_vectors,
            output_extents: self.extents().iter().flat_map(|e| e.bounds()).collect(),
            output_bins: self.bin_counts(),
        };
        trace!("Slice request {request:?}");
        request
    }
}

/// Metadata access on the output of a slice
pub trait OutputMetadata {
    /// Number of experiment info entries attached to the output
    fn num_experiment_info(&self) -> usize;

    /// Attach a named list of values
    fn add_property(&mut self, key: &str, values: &[f64], overwrite: bool);
}

/// Something that can execute a slice
pub trait SliceExecutor {
    type Output: OutputMetadata;

    /// Run the slice described by `request`
    fn execute(&self, request: &SliceRequest) -> Result<Self::Output>;
}

/// Plan, execute and annotate a cut
///
/// The flattened projection is attached under [W_MATRIX] only when the
/// output carries experiment info. Nothing is executed if planning fails.
pub fn cut<D, E>(dataset: &D, request: &CutRequest, executor: &E) -> Result<E::Output>
where
    D: MdDataset + ?Sized,
    E: SliceExecutor,
{
    let plan = CutPlan::build(dataset, request)?;
    let slice = plan.slice_request();

    let mut output = executor.execute(&slice)?;
    if output.num_experiment_info() > 0 {
        debug!("Attaching {W_MATRIX} to output");
        output.add_property(W_MATRIX, &plan.w_matrix(), true);
    }
    Ok(output)
}
