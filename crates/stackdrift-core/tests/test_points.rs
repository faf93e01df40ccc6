use approx::assert_abs_diff_eq;
use stackdrift_core::drift::{samples_from_annotations, DuplicatePolicy, PointTrackEstimator};
use stackdrift_core::{
    estimate_by_points, DriftConfig, DriftError, DriftEstimator, PointAnnotation, ShiftSample,
};

fn track() -> Vec<PointAnnotation> {
    vec![
        PointAnnotation::new(0, 100.0, 50.0),
        PointAnnotation::new(4, 101.0, 51.5),
        PointAnnotation::new(9, 102.5, 52.0),
        PointAnnotation::new(15, 103.0, 54.0),
        PointAnnotation::new(20, 105.0, 55.5),
    ]
}

#[test]
fn test_samples_relative_to_earliest_annotation() {
    let mut annotations = track();
    annotations.reverse();
    let samples = samples_from_annotations(&annotations, DuplicatePolicy::Last);
    assert_eq!(samples[0], ShiftSample::new(0, 0.0, 0.0));
    assert_eq!(samples[2], ShiftSample::new(9, 2.0, 2.5));
    let indices: Vec<usize> = samples.iter().map(|s| s.frame_index).collect();
    assert_eq!(indices, vec![0, 4, 9, 15, 20]);
}

#[test]
fn test_origin_need_not_be_frame_zero() {
    let annotations = vec![
        PointAnnotation::new(7, 10.0, 20.0),
        PointAnnotation::new(3, 12.0, 18.0),
    ];
    let samples = samples_from_annotations(&annotations, DuplicatePolicy::Last);
    assert_eq!(samples[0], ShiftSample::new(3, 0.0, 0.0));
    assert_eq!(samples[1], ShiftSample::new(7, 2.0, -2.0));
}

#[test]
fn test_estimate_invariant_to_annotation_order() {
    let config = DriftConfig::default();
    let forward = estimate_by_points(&track(), &config).unwrap();

    let mut shuffled = track();
    shuffled.swap(0, 3);
    shuffled.swap(1, 4);
    let permuted = estimate_by_points(&shuffled, &config).unwrap();

    for t in [0.0, 2.5, 9.0, 13.3, 20.0, 22.0] {
        assert_eq!(forward.evaluate(t), permuted.evaluate(t));
    }
}

#[test]
fn test_mean_policy_invariant_to_order_with_duplicates() {
    let config = DriftConfig {
        duplicate_policy: DuplicatePolicy::Mean,
        ..Default::default()
    };
    let mut annotations = track();
    annotations.push(PointAnnotation::new(9, 103.5, 53.0));
    annotations.push(PointAnnotation::new(15, 102.0, 53.0));
    let forward = estimate_by_points(&annotations, &config).unwrap();

    annotations.reverse();
    let reversed = estimate_by_points(&annotations, &config).unwrap();

    for t in [0.0, 4.0, 9.0, 15.0, 20.0] {
        let (ay, ax) = forward.evaluate(t);
        let (by, bx) = reversed.evaluate(t);
        assert_abs_diff_eq!(ay, by, epsilon = 1e-12);
        assert_abs_diff_eq!(ax, bx, epsilon = 1e-12);
    }
}

#[test]
fn test_duplicate_policies_differ() {
    let annotations = vec![
        PointAnnotation::new(0, 0.0, 0.0),
        PointAnnotation::new(5, 2.0, 4.0),
        PointAnnotation::new(5, 6.0, 8.0),
    ];
    let last = samples_from_annotations(&annotations, DuplicatePolicy::Last);
    assert_eq!(last[1], ShiftSample::new(5, 8.0, 6.0));

    let mean = samples_from_annotations(&annotations, DuplicatePolicy::Mean);
    assert_eq!(mean[1], ShiftSample::new(5, 6.0, 4.0));
}

#[test]
fn test_single_annotated_frame_is_insufficient() {
    let annotations = vec![
        PointAnnotation::new(4, 10.0, 10.0),
        PointAnnotation::new(4, 11.0, 12.0),
    ];
    match estimate_by_points(&annotations, &DriftConfig::default()) {
        Err(DriftError::InsufficientSamples { distinct }) => assert_eq!(distinct, 1),
        other => panic!("expected InsufficientSamples, got {other:?}"),
    }
}

#[test]
fn test_no_annotations_is_insufficient() {
    assert!(matches!(
        estimate_by_points(&[], &DriftConfig::default()),
        Err(DriftError::InsufficientSamples { distinct: 0 })
    ));
}

#[test]
fn test_two_annotated_frames_give_straight_line() {
    let annotations = vec![
        PointAnnotation::new(0, 0.0, 0.0),
        PointAnnotation::new(10, 5.0, -2.0),
    ];
    let trajectory = estimate_by_points(&annotations, &DriftConfig::default()).unwrap();
    let (dy, dx) = trajectory.evaluate(5.0);
    assert_abs_diff_eq!(dy, -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(dx, 2.5, epsilon = 1e-9);
    // Linear beyond the annotated range.
    let (dy, dx) = trajectory.evaluate(20.0);
    assert_abs_diff_eq!(dy, -4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(dx, 10.0, epsilon = 1e-9);
}

#[test]
fn test_point_estimator_uses_configured_policy() {
    let annotations = vec![
        PointAnnotation::new(0, 0.0, 0.0),
        PointAnnotation::new(2, 2.0, 2.0),
        PointAnnotation::new(2, 4.0, 4.0),
    ];
    let config = DriftConfig {
        duplicate_policy: DuplicatePolicy::Mean,
        ..Default::default()
    };
    let samples = PointTrackEstimator::new(&annotations, &config)
        .samples()
        .unwrap();
    assert_eq!(samples[1], ShiftSample::new(2, 3.0, 3.0));
}
