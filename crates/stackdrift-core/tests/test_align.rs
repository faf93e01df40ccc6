mod common;

use common::{drifting_stack, render_scene};
use ndarray::Array2;
use stackdrift_core::align::{register, register_arrays, shift_array};
use stackdrift_core::filters::gaussian_blur_array;
use stackdrift_core::{estimate_by_phase_correlation, DriftConfig, DriftError, Frame, MemoryStack};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn test_identical_frames_register_at_origin() {
    let scene = render_scene(0.0, 0.0, 2.0);
    let reg = register_arrays(&scene, &scene, 100).unwrap();
    assert!(reg.dy.abs() < 1e-9, "dy={}", reg.dy);
    assert!(reg.dx.abs() < 1e-9, "dx={}", reg.dx);
    assert!(reg.error < 1e-3, "error={}", reg.error);
}

#[test]
fn test_integer_shift_recovered_without_upsampling() {
    let reference = render_scene(0.0, 0.0, 2.0);
    let candidate = render_scene(3.0, -2.0, 2.0);
    let reg = register_arrays(&reference, &candidate, 1).unwrap();
    assert_eq!((reg.dy, reg.dx), (3.0, -2.0));
}

#[test]
fn test_subpixel_shift_recovered() {
    let reference = render_scene(0.0, 0.0, 2.0);
    for &(sy, sx) in &[(3.4, -2.7), (-1.23, 0.58), (0.07, 2.91)] {
        let candidate = render_scene(sy, sx, 2.0);
        let reg = register_arrays(&reference, &candidate, 100).unwrap();
        assert!((reg.dy - sy).abs() < 0.04, "dy={} expected {sy}", reg.dy);
        assert!((reg.dx - sx).abs() < 0.04, "dx={} expected {sx}", reg.dx);
    }
}

#[test]
fn test_subpixel_shift_recovered_after_prefilter() {
    let reference = gaussian_blur_array(&render_scene(0.0, 0.0, 2.0), 2.0);
    let candidate = gaussian_blur_array(&render_scene(-2.35, 1.6, 2.0), 2.0);
    let reg = register_arrays(&reference, &candidate, 100).unwrap();
    assert!((reg.dy + 2.35).abs() < 0.1, "dy={}", reg.dy);
    assert!((reg.dx - 1.6).abs() < 0.1, "dx={}", reg.dx);
}

#[test]
fn test_registration_error_in_unit_range() {
    let reference = render_scene(0.0, 0.0, 2.0);
    let unrelated = Array2::from_shape_fn((96, 96), |(r, c)| ((r * 31 + c * 17) % 13) as f32 / 13.0);
    let reg = register_arrays(&reference, &unrelated, 10).unwrap();
    assert!((0.0..=1.0).contains(&reg.error));
    assert!(reg.error > 0.5, "unrelated content should register poorly: {}", reg.error);
}

#[test]
fn test_blank_frames_report_full_error() {
    let blank = Array2::<f32>::zeros((32, 32));
    let reg = register_arrays(&blank, &blank, 10).unwrap();
    assert_eq!(reg.error, 1.0);
}

#[test]
fn test_register_rejects_mismatched_dimensions() {
    let a = Frame::new(Array2::zeros((32, 32)), 8);
    let b = Frame::new(Array2::zeros((32, 40)), 8);
    match register(&a, &b, 10) {
        Err(DriftError::DimensionMismatch { expected, found }) => {
            assert_eq!(expected, (32, 32));
            assert_eq!(found, (32, 40));
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_register_rejects_empty_frames() {
    let empty = Array2::<f32>::zeros((0, 0));
    assert!(matches!(
        register_arrays(&empty, &empty, 10),
        Err(DriftError::InvalidDimensions { .. })
    ));
}

// ---------------------------------------------------------------------------
// Warp
// ---------------------------------------------------------------------------

#[test]
fn test_shift_array_integer_translation() {
    let data = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f32);
    let shifted = shift_array(&data, 2.0, -1.0);
    assert_eq!(shifted[[4, 3]], data[[2, 4]]);
    // Rows uncovered by the translation are filled with zero.
    assert_eq!(shifted[[0, 3]], 0.0);
    assert_eq!(shifted[[1, 5]], 0.0);
}

#[test]
fn test_shift_array_direction_matches_registration() {
    let reference = render_scene(0.0, 0.0, 3.0);
    let moved = shift_array(&reference, 1.5, -0.75);
    let expected = render_scene(1.5, -0.75, 3.0);
    assert!(common::max_interior_diff(&moved, &expected, 10) < 0.03);
}

// ---------------------------------------------------------------------------
// Estimation preconditions
// ---------------------------------------------------------------------------

#[test]
fn test_estimation_rejects_mismatched_frames() {
    let frames = vec![
        Frame::new(render_scene(0.0, 0.0, 2.0), 32),
        Frame::new(Array2::zeros((64, 96)), 32),
    ];
    let stack = MemoryStack::new_unchecked(frames);
    let result = estimate_by_phase_correlation(&stack, &DriftConfig::default());
    assert!(matches!(result, Err(DriftError::DimensionMismatch { .. })));
}

#[test]
fn test_memory_stack_rejects_mismatched_frames() {
    let frames = vec![
        Frame::new(Array2::zeros((16, 16)), 8),
        Frame::new(Array2::zeros((16, 12)), 8),
    ];
    assert!(matches!(
        MemoryStack::new(frames),
        Err(DriftError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_estimation_needs_two_frames() {
    let stack = drifting_stack(1, 2.0, |_| (0.0, 0.0));
    match estimate_by_phase_correlation(&stack, &DriftConfig::default()) {
        Err(DriftError::EmptyStack { frames }) => assert_eq!(frames, 1),
        other => panic!("expected EmptyStack, got {other:?}"),
    }
}

#[test]
fn test_two_frame_stack_fits_a_line() {
    let stack = drifting_stack(2, 2.0, |i| (i as f64 * 1.5, -(i as f64)));
    let trajectory = estimate_by_phase_correlation(&stack, &DriftConfig::default()).unwrap();
    let (dy, dx) = trajectory.evaluate(1.0);
    assert!((dy - 1.5).abs() < 0.1, "dy={dy}");
    assert!((dx + 1.0).abs() < 0.1, "dx={dx}");
    let (dy0, dx0) = trajectory.evaluate(0.0);
    assert!(dy0.abs() < 1e-9 && dx0.abs() < 1e-9);
}
