//! Validation and sequencing of a full cut
//!
//! A [CutPlan] is built in a fixed sequence of [Stage]s, each feeding the
//! next. Any failure aborts the whole build so a partial plan is never seen.

// crate modules
use crate::binning::{resolve, resolve_all, BinDescriptor, ResolvedBin};
use crate::dataset::{CoordinateSystem, MdDataset};
use crate::error::{Error, Result};
use crate::extents::{transform, Extent};
use crate::frame::Frame;
use crate::labels::labels;
use crate::projection::ProjectionSpec;
use crate::request::CutRequest;
use crate::units::{needs_scaling, scale, UnitTag};

// mdtools modules
use mdtools_utils::{f, OptionExt, ValueExt};

// external crates
use log::{debug, warn};
use nalgebra::Matrix4;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

// standard library
use std::sync::OnceLock;

/// Units of the input (H, K, L) dimensions
const DATASET_UNITS: [UnitTag; 3] = [UnitTag::Rlu; 3];

/// Steps taken to build a [CutPlan], in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Validating,
    ResolvingProjection,
    ScalingUnits,
    TransformingExtents,
    ResolvingBins,
    Assembled,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::ResolvingProjection => "resolving projection",
            Stage::ScalingUnits => "scaling units",
            Stage::TransformingExtents => "transforming extents",
            Stage::ResolvingBins => "resolving bins",
            Stage::Assembled => "assembled",
        };
        write!(f, "{name}")
    }
}

/// Whether the output keeps individual events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// Event preserving output
    #[default]
    Events,
    /// Histogram only output
    Histogram,
}

impl OutputMode {
    /// Name of the slicing algorithm for this mode
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            OutputMode::Events => "SliceMD",
            OutputMode::Histogram => "BinMD",
        }
    }
}

impl From<bool> for OutputMode {
    /// Histogram output when `no_pix` is set
    fn from(no_pix: bool) -> Self {
        match no_pix {
            true => OutputMode::Histogram,
            false => OutputMode::Events,
        }
    }
}

/// Energy transfer axis carried through from a 4-D dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyAxis {
    /// Name of the dataset dimension
    pub name: String,
    /// Unit of the dataset dimension
    pub unit: String,
    /// Resolved binning
    pub bin: ResolvedBin,
}

/// The full set of parameters for a cut
///
/// Built once with [CutPlan::build()] and immutable afterwards.
///
/// ```rust
/// # use mdtools_cut::{CoordinateSystem, CutPlan, CutRequest, DatasetInfo, Dimension};
/// let dataset = DatasetInfo::new(
///     CoordinateSystem::Hkl,
///     vec![
///         Dimension::new("[H,0,0]", -1.0, 1.0, "r.l.u."),
///         Dimension::new("[0,K,0]", -1.0, 1.0, "r.l.u."),
///         Dimension::new("[0,0,L]", -1.0, 1.0, "r.l.u."),
///     ],
///     None,
/// );
///
/// let request = CutRequest::new(&[0.5], &[-0.1, 0.1], &[2.0]);
/// let plan = CutPlan::build(&dataset, &request).unwrap();
///
/// assert_eq!(plan.bin_counts(), vec![4, 1, 1]);
/// assert_eq!(plan.labels()[0], "[zeta, 0, 0]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPlan {
    projection: Frame,
    scaled: Frame,
    units: [UnitTag; 3],
    labels: [String; 3],
    bins: [ResolvedBin; 3],
    energy: Option<EnergyAxis>,
    mode: OutputMode,
}

impl CutPlan {
    /// Validate a request against a dataset and resolve every parameter
    ///
    /// Validation happens first and in order: the coordinate system, the
    /// number of dimensions, energy binning on a 3-D dataset, and finally
    /// the H, K, L naming of the first three dimensions if `check_axes` is
    /// set.
    ///
    /// The lattice is only requested from the dataset if the units of the
    /// projection differ from the r.l.u. of the dataset.
    pub fn build<D: MdDataset + ?Sized>(dataset: &D, request: &CutRequest) -> Result<Self> {
        enter(Stage::Validating);
        validate(dataset, request)?;

        enter(Stage::ResolvingProjection);
        let (projection, units) =
            ProjectionSpec::from_table(request.projection.as_ref())?.resolve();
        debug!("  frame {projection}, units {units:?}");

        enter(Stage::ScalingUnits);
        let scaled = match needs_scaling(&DATASET_UNITS, &units) {
            true => scale(&projection, &DATASET_UNITS, &units, &dataset.lattice()?)?,
            false => projection,
        };
        debug!("  scaled frame {scaled}");

        enter(Stage::TransformingExtents);
        let extents = [
            dataset.dimension_extent(0)?,
            dataset.dimension_extent(1)?,
            dataset.dimension_extent(2)?,
        ];
        let transformed = transform(&scaled, &extents)?;

        enter(Stage::ResolvingBins);
        let bins = request.bins();
        let mut descriptors = Vec::with_capacity(3);
        for (dimension, values) in bins.iter().take(3).enumerate() {
            descriptors.push(BinDescriptor::parse(dimension, values)?);
        }
        let resolved = resolve_all(transformed.into_iter().zip(descriptors))?;
        let bins = [resolved[0], resolved[1], resolved[2]];
        let energy = energy_axis(dataset, request)?;
        debug!("  bins {bins:?}");

        let plan = Self {
            labels: labels(&projection),
            projection,
            scaled,
            units,
            bins,
            energy,
            mode: OutputMode::from(request.no_pix),
        };

        enter(Stage::Assembled);
        debug!("  {}", plan.summary());
        Ok(plan)
    }

    /// Projection frame as given by the user, before any unit scaling
    pub fn projection(&self) -> &Frame {
        &self.projection
    }

    /// Projection frame after unit scaling
    pub fn scaled(&self) -> &Frame {
        &self.scaled
    }

    /// Unit tag of each spatial axis
    pub fn units(&self) -> &[UnitTag; 3] {
        &self.units
    }

    /// Label of each spatial axis
    pub fn labels(&self) -> &[String; 3] {
        &self.labels
    }

    /// Resolved binning of the spatial axes
    pub fn bins(&self) -> &[ResolvedBin; 3] {
        &self.bins
    }

    /// Energy axis, for 4-D datasets only
    pub fn energy(&self) -> Option<&EnergyAxis> {
        self.energy.as_ref()
    }

    /// Event preserving or histogram output
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Number of output dimensions, 3 or 4
    pub fn num_dims(&self) -> usize {
        match self.energy {
            Some(_) => 4,
            None => 3,
        }
    }

    /// Output extents of every dimension in order
    pub fn extents(&self) -> Vec<Extent> {
        self.resolved_bins().map(|b| b.extent).collect()
    }

    /// Output bin counts of every dimension in order
    pub fn bin_counts(&self) -> Vec<usize> {
        self.resolved_bins().map(|b| b.bins).collect()
    }

    /// Flattened row-major projection matrix `[u, v, w]`
    pub fn w_matrix(&self) -> [f64; 9] {
        let [u, v, w] = self.projection.axes();
        [u[0], u[1], u[2], v[0], v[1], v[2], w[0], w[1], w[2]]
    }

    /// Projection as a 4x4 matrix including the energy axis
    ///
    /// The upper left 3x3 block holds `u`, `v` and `w` as rows, and energy
    /// maps onto itself.
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&self.projection.matrix());
        m
    }

    fn resolved_bins(&self) -> impl Iterator<Item = &ResolvedBin> {
        self.bins.iter().chain(self.energy.iter().map(|e| &e.bin))
    }

    /// One line summary for logging
    fn summary(&self) -> String {
        f!(
            "{} cut with {:?} bins over {:?}",
            self.mode.algorithm_name(),
            self.bin_counts(),
            self.extents()
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
        )
    }
}

impl std::fmt::Display for CutPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let head = f!(" > Cut plan [{}]", self.mode.algorithm_name());
        let mut s = f!("{}\n{}\n{}\n", "-".repeat(60), head, "-".repeat(60));

        for (i, bin) in self.bins.iter().enumerate() {
            s += &f!(
                "{:<18} {} : {:>10} - {:>10} ({} bins)\n",
                self.labels[i],
                self.units[i],
                bin.extent.min.fixed(4),
                bin.extent.max.fixed(4),
                bin.bins
            );
        }

        let energy = self.energy.as_ref().map(|e| {
            f!(
                "{} {} : {:>10} - {:>10} ({} bins)",
                e.name,
                e.unit,
                e.bin.extent.min.sci(3, 2),
                e.bin.extent.max.sci(3, 2),
                e.bin.bins
            )
        });
        s += &f!("energy : {}\n", energy.display());
        write!(f, "{}", s)
    }
}

/// Plan many independent cuts of the same dataset in parallel
///
/// Results are returned in the order of `requests`, a failure in one does
/// not affect the others.
pub fn plan_many<D>(dataset: &D, requests: &[CutRequest]) -> Vec<Result<CutPlan>>
where
    D: MdDataset + Sync + ?Sized,
{
    requests
        .par_iter()
        .map(|request| CutPlan::build(dataset, request))
        .collect()
}

fn enter(stage: Stage) {
    debug!("Cut stage: {stage}");
}

fn validate<D: MdDataset + ?Sized>(dataset: &D, request: &CutRequest) -> Result<()> {
    let found = dataset.coordinate_system();
    if found != CoordinateSystem::Hkl {
        return Err(Error::WrongCoordinateSystem { found });
    }

    let ndims = dataset.num_dims();
    if !(3..=4).contains(&ndims) {
        return Err(Error::UnsupportedDimensionality {
            found: ndims,
            reason: "expected 3 or 4 dimensions",
        });
    }

    if ndims == 3 && !request.p4_bin.is_empty() {
        return Err(Error::UnsupportedDimensionality {
            found: ndims,
            reason: "energy binning given without an energy dimension",
        });
    }

    if request.check_axes {
        check_axes(dataset)
    } else {
        warn!("Axis checking is disabled, dimensions are assumed to be H, K, L in order");
        Ok(())
    }
}

/// Axis name patterns, compiled on first use and shared between plans
static AXIS_PATTERNS: OnceLock<std::result::Result<[Regex; 3], regex::Error>> = OnceLock::new();

/// Dimension names must start with the axis letter or its `[H,0,0]` style
fn axis_patterns() -> Result<&'static [Regex; 3]> {
    let patterns = AXIS_PATTERNS.get_or_init(|| {
        Ok([
            Regex::new(r"^(?:H.*|\[H,0,0\].*)$")?,
            Regex::new(r"^(?:K.*|\[0,K,0\].*)$")?,
            Regex::new(r"^(?:L.*|\[0,0,L\].*)$")?,
        ])
    });
    patterns.as_ref().map_err(|e| Error::FailedRegex(e.clone()))
}

fn check_axes<D: MdDataset + ?Sized>(dataset: &D) -> Result<()> {
    for (index, pattern) in axis_patterns()?.iter().enumerate() {
        let name = dataset.dimension_name(index)?;
        if !pattern.is_match(&name) {
            return Err(Error::AxisOrder { index, name });
        }
    }
    Ok(())
}

/// Energy binning against the dataset's own fourth dimension
fn energy_axis<D: MdDataset + ?Sized>(
    dataset: &D,
    request: &CutRequest,
) -> Result<Option<EnergyAxis>> {
    if dataset.num_dims() < 4 {
        return Ok(None);
    }

    let extent = dataset.dimension_extent(3)?;
    let bin = match request.p4_bin.is_empty() {
        true => ResolvedBin { bins: 1, extent },
        false => resolve(3, extent, BinDescriptor::parse(3, &request.p4_bin)?)?,
    };

    Ok(Some(EnergyAxis {
        name: dataset.dimension_name(3)?,
        unit: dataset.dimension_unit(3)?,
        bin,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetInfo, Dimension};
    use rstest::{fixture, rstest};

    #[fixture]
    fn dataset() -> DatasetInfo {
        DatasetInfo::new(
            CoordinateSystem::Hkl,
            vec![
                Dimension::new("[H,0,0]", -1.0, 1.0, "r.l.u."),
                Dimension::new("[0,K,0]", -1.0, 1.0, "r.l.u."),
                Dimension::new("[0,0,L]", -1.0, 1.0, "r.l.u."),
            ],
            None,
        )
    }

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Validating < Stage::ResolvingProjection);
        assert!(Stage::ResolvingBins < Stage::Assembled);
    }

    #[test]
    fn output_mode_from_no_pix() {
        assert_eq!(OutputMode::from(true).algorithm_name(), "BinMD");
        assert_eq!(OutputMode::from(false).algorithm_name(), "SliceMD");
    }

    #[rstest]
    #[case(&["H", "K", "L"])]
    #[case(&["[H,0,0]", "[0,K,0]", "[0,0,L]"])]
    #[case(&["H (r.l.u.)", "Kay", "L"])]
    fn accepted_axis_names(#[case] names: &[&str]) {
        let dimensions = names
            .iter()
            .map(|n| Dimension::new(n, 0.0, 1.0, ""))
            .collect();
        let dataset = DatasetInfo::new(CoordinateSystem::Hkl, dimensions, None);
        assert!(check_axes(&dataset).is_ok());
    }

    #[rstest]
    #[case(&["K", "H", "L"], 0)]
    #[case(&["H", "[0,0,L]", "K"], 1)]
    #[case(&["[H,0,0]", "[0,K,0]", "DeltaE"], 2)]
    #[case(&["h", "k", "l"], 0)]
    fn rejected_axis_names(#[case] names: &[&str], #[case] expected: usize) {
        let dimensions = names
            .iter()
            .map(|n| Dimension::new(n, 0.0, 1.0, ""))
            .collect();
        let dataset = DatasetInfo::new(CoordinateSystem::Hkl, dimensions, None);
        match check_axes(&dataset) {
            Err(Error::AxisOrder { index, name }) => {
                assert_eq!(index, expected);
                assert_eq!(name, names[expected]);
            }
            other => panic!("expected AxisOrder, got {other:?}"),
        }
    }

    #[test]
    fn axis_patterns_compiled_once() {
        let first = axis_patterns().unwrap();
        let second = axis_patterns().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[rstest]
    fn w_matrix_is_unscaled_projection(dataset: DatasetInfo) {
        let plan = CutPlan::build(&dataset, &CutRequest::new(&[2.0], &[2.0], &[2.0])).unwrap();
        assert_eq!(
            plan.w_matrix(),
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(plan.projection_matrix(), Matrix4::identity());
    }

    #[rstest]
    fn display_lists_every_axis(dataset: DatasetInfo) {
        let plan = CutPlan::build(&dataset, &CutRequest::new(&[0.5], &[2.0], &[2.0])).unwrap();
        let text = plan.to_string();
        assert!(text.contains("Cut plan [SliceMD]"));
        assert!(text.contains("[zeta, 0, 0]"));
        assert!(text.contains("(4 bins)"));
        assert!(text.contains("energy : none"));
    }
}
