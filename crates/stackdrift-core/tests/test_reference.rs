mod common;

use common::drifting_stack;
use stackdrift_core::drift::{estimate_shifts, estimate_shifts_reported, PhaseCorrelationEstimator};
use stackdrift_core::{DriftConfig, DriftError, DriftEstimator, ShiftSample};

fn linear_drift(i: usize) -> (f64, f64) {
    (0.3 * i as f64, -0.2 * i as f64)
}

#[test]
fn test_samples_cover_every_frame_in_order() {
    let stack = drifting_stack(6, 2.0, linear_drift);
    let estimates = estimate_shifts(&stack, &DriftConfig::default()).unwrap();
    let indices: Vec<usize> = estimates.samples.iter().map(|s| s.frame_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(estimates.samples[0], ShiftSample::new(0, 0.0, 0.0));
    assert_eq!(estimates.errors.len(), estimates.samples.len());
    assert_eq!(estimates.errors[0], 0.0);
    assert_eq!(estimates.registered_frames(), 5);
}

#[test]
fn test_shifts_track_linear_drift() {
    let stack = drifting_stack(8, 2.0, linear_drift);
    let estimates = estimate_shifts(&stack, &DriftConfig::default()).unwrap();
    for s in &estimates.samples {
        let (ey, ex) = linear_drift(s.frame_index);
        assert!((s.dy - ey).abs() < 0.1, "frame {}: dy={} expected {ey}", s.frame_index, s.dy);
        assert!((s.dx - ex).abs() < 0.1, "frame {}: dx={} expected {ex}", s.frame_index, s.dx);
    }
    for &e in &estimates.errors {
        assert!((0.0..=1.0).contains(&e));
    }
}

#[test]
fn test_zero_threshold_replaces_reference_after_every_frame() {
    let stack = drifting_stack(6, 2.0, linear_drift);
    let config = DriftConfig {
        update_threshold: 0,
        ..Default::default()
    };
    let estimates = estimate_shifts(&stack, &config).unwrap();
    assert_eq!(estimates.reference_updates, vec![1, 2, 3, 4, 5]);
    // Replaced references are motion compensated, so samples stay absolute.
    let last = estimates.samples[5];
    assert!((last.dy - 1.5).abs() < 0.15, "dy={}", last.dy);
    assert!((last.dx + 1.0).abs() < 0.15, "dx={}", last.dx);
}

#[test]
fn test_threshold_at_stack_length_never_replaces_reference() {
    let n = 6;
    let stack = drifting_stack(n, 2.0, linear_drift);
    let config = DriftConfig {
        update_threshold: n,
        ..Default::default()
    };
    let estimates = estimate_shifts(&stack, &config).unwrap();
    assert!(estimates.reference_updates.is_empty());
    assert_eq!(estimates.samples.len(), n);
}

#[test]
fn test_reference_replaced_once_threshold_exceeded() {
    let stack = drifting_stack(8, 2.0, linear_drift);
    let config = DriftConfig {
        update_threshold: 2,
        ..Default::default()
    };
    let estimates = estimate_shifts(&stack, &config).unwrap();
    assert_eq!(estimates.reference_updates, vec![3, 6]);
}

#[test]
fn test_progress_callback_sees_each_registered_frame() {
    let stack = drifting_stack(5, 2.0, linear_drift);
    let mut seen = Vec::new();
    estimate_shifts_reported(&stack, &DriftConfig::default(), |i| seen.push(i)).unwrap();
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

#[test]
fn test_empty_stack_rejected() {
    let stack = drifting_stack(0, 2.0, linear_drift);
    assert!(matches!(
        estimate_shifts(&stack, &DriftConfig::default()),
        Err(DriftError::EmptyStack { frames: 0 })
    ));
}

#[test]
fn test_invalid_config_rejected_before_reading() {
    let stack = drifting_stack(3, 2.0, linear_drift);
    let config = DriftConfig {
        upsample_factor: 0,
        ..Default::default()
    };
    assert!(matches!(
        estimate_shifts(&stack, &config),
        Err(DriftError::InvalidConfig(_))
    ));
}

#[test]
fn test_estimator_trait_matches_free_function() {
    let stack = drifting_stack(5, 2.0, linear_drift);
    let config = DriftConfig::default();
    let estimator = PhaseCorrelationEstimator::new(&stack, &config);
    let samples = estimator.samples().unwrap();
    let estimates = estimate_shifts(&stack, &config).unwrap();
    assert_eq!(samples, estimates.samples);

    let trajectory = estimator.estimate().unwrap();
    let (dy, dx) = trajectory.evaluate(4.0);
    assert!((dy - 1.2).abs() < 0.15, "dy={dy}");
    assert!((dx + 0.8).abs() < 0.15, "dx={dx}");
}
