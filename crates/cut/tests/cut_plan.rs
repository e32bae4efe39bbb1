//! Integration tests for planning and executing full cuts

use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use mdtools_cut::{
    cut, plan_many, CoordinateSystem, CutPlan, CutRequest, DatasetInfo, Dimension, Error, Extent,
    MdDataset, OutputMetadata, OutputMode, ProjectionTable, SliceExecutor, SliceRequest, UnitTag,
    W_MATRIX,
};
use mdtools_lattice::Lattice;
use rstest::{fixture, rstest};

#[fixture]
fn hkl_3d() -> DatasetInfo {
    DatasetInfo::from_json_file("./data/datasets/hkl_3d.json").unwrap()
}

#[fixture]
fn hkl_4d() -> DatasetInfo {
    DatasetInfo::from_json_file("./data/datasets/hkl_4d.json").unwrap()
}

fn projection(u: [f64; 3], v: [f64; 3]) -> ProjectionTable {
    ProjectionTable::new()
        .with_column("u", u)
        .with_column("v", v)
        .with_units([UnitTag::Rlu; 3])
}

/// Output of a slice that remembers what it was asked to do
#[derive(Debug, Default)]
struct RecordedOutput {
    request: Option<SliceRequest>,
    experiment_info: usize,
    properties: BTreeMap<String, Vec<f64>>,
}

impl OutputMetadata for RecordedOutput {
    fn num_experiment_info(&self) -> usize {
        self.experiment_info
    }

    fn add_property(&mut self, key: &str, values: &[f64], _overwrite: bool) {
        self.properties.insert(key.to_string(), values.to_vec());
    }
}

struct Recorder {
    experiment_info: usize,
    fail: bool,
}

impl SliceExecutor for Recorder {
    type Output = RecordedOutput;

    fn execute(&self, request: &SliceRequest) -> mdtools_cut::Result<Self::Output> {
        if self.fail {
            return Err(Error::Execution("cancelled".to_string()));
        }
        Ok(RecordedOutput {
            request: Some(request.clone()),
            experiment_info: self.experiment_info,
            ..Default::default()
        })
    }
}

#[rstest]
fn step_equal_to_range_is_one_bin(hkl_3d: DatasetInfo) {
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0]);
    let plan = CutPlan::build(&hkl_3d, &request).unwrap();
    assert_eq!(plan.bin_counts(), vec![1, 1, 1]);
    assert_eq!(plan.extents(), vec![Extent::new(-1.0, 1.0); 3]);
}

const INEXACT: [Extent; 3] = [
    Extent { min: -0.3, max: 0.1 },
    Extent { min: -2.3, max: 4.1 },
    Extent { min: 0.7, max: 1.9 },
];

#[fixture]
fn inexact() -> DatasetInfo {
    let dimensions = ["H", "K", "L"]
        .iter()
        .zip(INEXACT)
        .map(|(name, e)| Dimension::new(name, e.min, e.max, "r.l.u."))
        .collect();
    DatasetInfo::new(CoordinateSystem::Hkl, dimensions, None)
}

#[rstest]
fn identity_keeps_inexact_extents(inexact: DatasetInfo) {
    let plan = CutPlan::build(&inexact, &CutRequest::new(&[10.0], &[10.0], &[10.0])).unwrap();
    assert_eq!(plan.extents(), INEXACT.to_vec());
    assert_eq!(plan.bin_counts(), vec![1, 1, 1]);
}

#[rstest]
fn stepped_inexact_extents_stay_inside(inexact: DatasetInfo) {
    let plan = CutPlan::build(&inexact, &CutRequest::new(&[0.2], &[0.1], &[0.3])).unwrap();
    for (extent, requested) in plan.extents().into_iter().zip(INEXACT) {
        assert_eq!(extent.min, requested.min);
        assert!(extent.max <= requested.max, "{} > {}", extent.max, requested.max);
    }
}

#[rstest]
fn derived_w_keeps_bounding_box(hkl_3d: DatasetInfo) {
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0])
        .with_projection(projection([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]));
    let plan = CutPlan::build(&hkl_3d, &request).unwrap();
    assert_eq!(plan.projection().w, [0.0, 0.0, -1.0]);

    let w = plan.extents()[2];
    assert_abs_diff_eq!(w.min, -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(w.max, 1.0, epsilon = 1e-12);
    assert_eq!(plan.labels()[2], "[0, 0, -xi]");
}

#[test]
fn range_with_step_on_transformed_extent() {
    let dataset = DatasetInfo::new(
        CoordinateSystem::Hkl,
        vec![
            Dimension::new("H", 0.0, 2.0, "r.l.u."),
            Dimension::new("K", 0.0, 2.0, "r.l.u."),
            Dimension::new("L", 0.0, 2.0, "r.l.u."),
        ],
        None,
    );
    let request = CutRequest::new(&[0.0, 0.5, 2.0], &[2.0], &[2.0]);
    let plan = CutPlan::build(&dataset, &request).unwrap();
    assert_eq!(plan.bins()[0].bins, 4);
    assert_eq!(plan.bins()[0].extent, Extent::new(0.0, 2.0));
}

#[rstest]
#[case(CutRequest::new(&[], &[2.0], &[2.0]), 0)]
#[case(CutRequest::new(&[2.0], &[2.0], &[]), 2)]
fn empty_bin_spec(hkl_3d: DatasetInfo, #[case] request: CutRequest, #[case] expected: usize) {
    match CutPlan::build(&hkl_3d, &request) {
        Err(Error::EmptyBinSpec { dimension }) => assert_eq!(dimension, expected),
        other => panic!("expected EmptyBinSpec, got {other:?}"),
    }
}

#[rstest]
fn parallel_projection_is_singular(hkl_3d: DatasetInfo) {
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0])
        .with_projection(projection([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]));
    let result = CutPlan::build(&hkl_3d, &request);
    assert!(matches!(result, Err(Error::SingularBasis { .. })));
}

#[test]
fn wrong_coordinate_system_is_reported_first() {
    let dataset = DatasetInfo::from_json_file("./data/datasets/qlab.json").unwrap();
    assert_eq!(dataset.coordinate_system(), CoordinateSystem::QLab);

    // everything else about this request is wrong too
    let request = CutRequest::default().with_energy_bin(&[1.0, 2.0, 3.0, 4.0]);
    let result = CutPlan::build(&dataset, &request);
    assert!(matches!(
        result,
        Err(Error::WrongCoordinateSystem {
            found: CoordinateSystem::QLab
        })
    ));
}

#[rstest]
fn diagonal_cut_from_json(hkl_3d: DatasetInfo) {
    let request = CutRequest::from_json_file("./data/requests/diagonal.json").unwrap();
    let plan = CutPlan::build(&hkl_3d, &request).unwrap();

    assert_eq!(plan.mode(), OutputMode::Histogram);
    assert_eq!(plan.bin_counts(), vec![8, 1, 1]);
    assert_eq!(plan.labels()[0], "[zeta, zeta, 0]");
    assert_eq!(plan.labels()[1], "[-eta, eta, 0]");
    assert_eq!(plan.labels()[2], "[0, 0, -2.00xi]");

    let slice = plan.slice_request();
    assert_eq!(slice.algorithm, "BinMD");
    assert!(!slice.normalize_basis_vectors);
    assert!(!slice.axis_aligned);
    assert_eq!(
        slice.basis_vectors[1].to_string(),
        "[-eta, eta, 0], r, -1.0,1.0,0.0"
    );
    assert_eq!(slice.output_extents.len(), 6);
    assert_abs_diff_eq!(slice.output_extents[4], -0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(slice.output_extents[5], 0.5, epsilon = 1e-12);
}

#[rstest]
fn inverse_angstrom_scales_extents_only(hkl_3d: DatasetInfo) {
    let request = CutRequest::from_json_file("./data/requests/inverse_angstrom.json").unwrap();
    let plan = CutPlan::build(&hkl_3d, &request).unwrap();

    // 2pi d* = 2 along every axis for a cubic cell with a = pi
    assert_abs_diff_eq!(plan.scaled().u[0], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(plan.extents()[1].min, -0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(plan.extents()[1].max, 0.5, epsilon = 1e-12);
    assert_eq!(plan.bin_counts(), vec![3, 1, 1]);

    // basis vectors and labels keep the projection as given
    assert_eq!(plan.projection().u, [1.0, 0.0, 0.0]);
    let slice = plan.slice_request();
    assert_eq!(slice.basis_vectors[0].to_string(), "[zeta, 0, 0], a, 1.0,0.0,0.0");
    assert_eq!(plan.w_matrix()[0], 1.0);
}

#[rstest]
fn inverse_angstrom_needs_a_lattice(hkl_4d: DatasetInfo) {
    let request = CutRequest::from_json_file("./data/requests/inverse_angstrom.json").unwrap();
    assert!(matches!(
        CutPlan::build(&hkl_4d, &request),
        Err(Error::MissingLattice)
    ));
}

#[rstest]
fn rlu_projection_never_reads_the_lattice(hkl_4d: DatasetInfo) {
    assert!(hkl_4d.lattice().is_err());
    let request = CutRequest::new(&[0.5], &[0.5], &[2.0])
        .with_projection(projection([1.0, 1.0, 0.0], [1.0, -1.0, 0.0]));
    assert!(CutPlan::build(&hkl_4d, &request).is_ok());
}

#[rstest]
fn energy_axis_carried_through(hkl_4d: DatasetInfo) {
    let request = CutRequest::new(&[0.5], &[0.5], &[2.0]);
    let plan = CutPlan::build(&hkl_4d, &request).unwrap();

    assert_eq!(plan.num_dims(), 4);
    assert_eq!(plan.bin_counts(), vec![8, 8, 1, 1]);

    let energy = plan.energy().unwrap();
    assert_eq!(energy.name, "DeltaE");
    assert_eq!(energy.unit, "meV");
    assert_eq!(energy.bin.extent, Extent::new(-10.0, 50.0));
}

#[rstest]
#[case(&[5.0], 12, Extent::new(-10.0, 50.0))]
#[case(&[0.0, 2.5, 20.0], 8, Extent::new(0.0, 20.0))]
#[case(&[-1.0, 1.0], 1, Extent::new(-1.0, 1.0))]
fn energy_binning(
    hkl_4d: DatasetInfo,
    #[case] p4_bin: &[f64],
    #[case] bins: usize,
    #[case] extent: Extent,
) {
    let request = CutRequest::new(&[0.5], &[0.5], &[2.0]).with_energy_bin(p4_bin);
    let plan = CutPlan::build(&hkl_4d, &request).unwrap();
    let energy = plan.energy().unwrap();
    assert_eq!(energy.bin.bins, bins);
    assert_eq!(energy.bin.extent, extent);
}

#[rstest]
fn four_dimensional_slice_request(hkl_4d: DatasetInfo) {
    let request = CutRequest::new(&[0.5], &[0.5], &[2.0]).with_energy_bin(&[5.0]);
    let slice = CutPlan::build(&hkl_4d, &request).unwrap().slice_request();

    assert_eq!(slice.algorithm, "SliceMD");
    assert_eq!(slice.basis_vectors.len(), 4);
    assert_eq!(
        slice.basis_vectors[0].to_string(),
        "[zeta, 0, 0], r, 1.0,0.0,0.0,0.0"
    );
    assert_eq!(
        slice.basis_vectors[3].to_string(),
        "DeltaE, meV, 0.0,0.0,0.0,1.0"
    );
    assert_eq!(slice.output_bins, vec![8, 8, 1, 12]);
    assert_eq!(&slice.output_extents[6..], &[-10.0, 50.0]);
}

#[rstest]
fn energy_binning_on_3d_dataset(hkl_3d: DatasetInfo) {
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0]).with_energy_bin(&[1.0]);
    assert!(matches!(
        CutPlan::build(&hkl_3d, &request),
        Err(Error::UnsupportedDimensionality { found: 3, .. })
    ));
}

#[rstest]
#[case(2)]
#[case(5)]
fn unsupported_dimensionality(#[case] ndims: usize) {
    let dimensions = (0..ndims)
        .map(|i| Dimension::new(["H", "K", "L", "E", "T"][i], 0.0, 1.0, ""))
        .collect();
    let dataset = DatasetInfo::new(CoordinateSystem::Hkl, dimensions, None);
    let request = CutRequest::new(&[1.0], &[1.0], &[1.0]);
    match CutPlan::build(&dataset, &request) {
        Err(Error::UnsupportedDimensionality { found, .. }) => assert_eq!(found, ndims),
        other => panic!("expected UnsupportedDimensionality, got {other:?}"),
    }
}

#[test]
fn axis_check_can_be_disabled() {
    let dataset = DatasetInfo::new(
        CoordinateSystem::Hkl,
        vec![
            Dimension::new("L", -1.0, 1.0, "r.l.u."),
            Dimension::new("K", -1.0, 1.0, "r.l.u."),
            Dimension::new("H", -1.0, 1.0, "r.l.u."),
        ],
        None,
    );
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0]);

    match CutPlan::build(&dataset, &request) {
        Err(Error::AxisOrder { index, name }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "L");
        }
        other => panic!("expected AxisOrder, got {other:?}"),
    }

    let request = request.with_check_axes(false);
    assert!(CutPlan::build(&dataset, &request).is_ok());
}

#[rstest]
#[case(1, true)]
#[case(0, false)]
fn w_matrix_only_with_experiment_info(
    hkl_3d: DatasetInfo,
    #[case] experiment_info: usize,
    #[case] annotated: bool,
) {
    let request = CutRequest::new(&[0.5], &[2.0], &[2.0])
        .with_projection(projection([1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]));
    let executor = Recorder {
        experiment_info,
        fail: false,
    };

    let output = cut(&hkl_3d, &request, &executor).unwrap();
    assert_eq!(output.request.unwrap().output_bins, vec![4, 1, 1]);

    match annotated {
        true => assert_eq!(
            output.properties[W_MATRIX],
            vec![1.0, 1.0, 0.0, -1.0, 1.0, 0.0, 0.0, 0.0, -2.0]
        ),
        false => assert!(output.properties.is_empty()),
    }
}

#[rstest]
fn failed_planning_never_executes(hkl_3d: DatasetInfo) {
    // executing would fail loudly, planning fails first
    let executor = Recorder {
        experiment_info: 1,
        fail: true,
    };
    let request = CutRequest::new(&[], &[], &[]);
    let result = cut(&hkl_3d, &request, &executor);
    assert!(matches!(result, Err(Error::EmptyBinSpec { dimension: 0 })));
}

#[rstest]
fn executor_errors_propagate(hkl_3d: DatasetInfo) {
    let executor = Recorder {
        experiment_info: 1,
        fail: true,
    };
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0]);
    let result = cut(&hkl_3d, &request, &executor);
    assert!(matches!(result, Err(Error::Execution(_))));
}

#[rstest]
fn many_plans_in_order(hkl_4d: DatasetInfo) {
    let requests = vec![
        CutRequest::new(&[0.5], &[0.5], &[2.0]),
        CutRequest::new(&[], &[0.5], &[2.0]),
        CutRequest::new(&[1.0], &[4.0], &[2.0]).with_energy_bin(&[10.0]),
        CutRequest::new(&[0.5], &[0.5], &[2.0])
            .with_projection(projection([1.0, 0.0, 0.0], [1.0, 0.0, 0.0])),
    ];

    let plans = plan_many(&hkl_4d, &requests);
    assert_eq!(plans.len(), 4);
    assert_eq!(plans[0].as_ref().unwrap().bin_counts(), vec![8, 8, 1, 1]);
    assert!(matches!(plans[1], Err(Error::EmptyBinSpec { dimension: 0 })));
    assert_eq!(plans[2].as_ref().unwrap().bin_counts(), vec![4, 1, 1, 6]);
    assert!(matches!(plans[3], Err(Error::SingularBasis { .. })));
}

#[test]
fn inverse_angstrom_with_cubic_lattice() {
    let dataset = DatasetInfo::new(
        CoordinateSystem::Hkl,
        vec![
            Dimension::new("H", -1.0, 1.0, ""),
            Dimension::new("K", -1.0, 1.0, ""),
            Dimension::new("L", -1.0, 1.0, ""),
        ],
        Some(Lattice::cubic(5.0).unwrap()),
    );
    let request = CutRequest::new(&[2.0], &[2.0], &[2.0]).with_projection(
        projection([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]).with_units([UnitTag::InverseAngstrom; 3]),
    );
    let plan = CutPlan::build(&dataset, &request).unwrap();

    // 2pi / 5 per unit of H
    let factor = std::f64::consts::TAU / 5.0;
    assert_abs_diff_eq!(plan.scaled().u[0], factor, epsilon = 1e-12);
    assert_abs_diff_eq!(plan.extents()[0].max, 1.0 / factor, epsilon = 1e-12);
}
