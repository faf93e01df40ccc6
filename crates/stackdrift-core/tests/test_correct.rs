mod common;

use common::{drifting_stack, max_interior_diff, render_scene};
use ndarray::Array2;
use stackdrift_core::{
    apply_correction, estimate_by_phase_correlation, DriftConfig, DriftTrajectory, Frame,
    FrameSource, MemoryStack, ShiftSample,
};

fn linear_drift(i: usize) -> (f64, f64) {
    (0.3 * i as f64, -0.25 * i as f64)
}

fn true_trajectory(frames: usize) -> DriftTrajectory {
    let samples: Vec<ShiftSample> = (0..frames)
        .map(|i| {
            let (dy, dx) = linear_drift(i);
            ShiftSample::new(i, dy, dx)
        })
        .collect();
    DriftTrajectory::fit(&samples, 0.0).unwrap()
}

#[test]
fn test_known_trajectory_restores_originals() {
    let n = 10;
    let stack = drifting_stack(n, 3.0, linear_drift);
    let trajectory = true_trajectory(n);
    let original = render_scene(0.0, 0.0, 3.0);

    let corrected = apply_correction(&stack, &trajectory);
    for i in 0..n {
        let frame = corrected.read_frame(i).unwrap();
        let diff = max_interior_diff(&frame.data, &original, 12);
        assert!(diff < 0.035, "frame {i}: max diff {diff}");
    }
}

#[test]
fn test_estimated_trajectory_restores_originals() {
    let n = 12;
    let stack = drifting_stack(n, 3.0, linear_drift);
    let trajectory = estimate_by_phase_correlation(&stack, &DriftConfig::default()).unwrap();
    let original = render_scene(0.0, 0.0, 3.0);

    let frames = apply_correction(&stack, &trajectory).correct_all().unwrap();
    assert_eq!(frames.len(), n);
    for frame in &frames {
        let diff = max_interior_diff(&frame.data, &original, 12);
        assert!(diff < 0.06, "frame {}: max diff {diff}", frame.frame_index);
    }
}

#[test]
fn test_random_access_matches_batch() {
    let n = 7;
    let stack = drifting_stack(n, 3.0, linear_drift);
    let trajectory = true_trajectory(n);
    let corrected = apply_correction(&stack, &trajectory);

    let batch = corrected.correct_all().unwrap();
    for &i in &[5, 2, 6, 0, 2] {
        let single = corrected.read_frame(i).unwrap();
        assert_eq!(single.frame_index, i);
        assert_eq!(single.data, batch[i].data);
    }
}

#[test]
fn test_iteration_restartable_from_any_index() {
    let n = 6;
    let stack = drifting_stack(n, 3.0, linear_drift);
    let trajectory = true_trajectory(n);
    let corrected = apply_correction(&stack, &trajectory);

    let tail: Vec<Frame> = corrected.iter_from(3).collect::<Result<_, _>>().unwrap();
    assert_eq!(tail.len(), 3);
    assert_eq!(tail[0].frame_index, 3);

    let all: Vec<Frame> = corrected.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(all[3].data, tail[0].data);
}

#[test]
fn test_chunks_cover_every_frame_once() {
    let n = 9;
    let stack = drifting_stack(n, 3.0, linear_drift);
    let trajectory = true_trajectory(n);
    let corrected = apply_correction(&stack, &trajectory);

    let indices: Vec<usize> = corrected
        .chunks(4)
        .flat_map(|chunk| chunk.unwrap())
        .map(|f| f.frame_index)
        .collect();
    assert_eq!(indices, (0..n).collect::<Vec<_>>());
}

#[test]
fn test_integer_frames_are_quantized() {
    let levels = Array2::from_shape_fn((16, 16), |(r, c)| ((r * 16 + c) % 256) as f32 / 255.0);
    let frames = vec![Frame::new(levels.clone(), 8), Frame::new(levels, 8)];
    let stack = MemoryStack::new(frames).unwrap();
    let samples = vec![ShiftSample::new(0, 0.0, 0.0), ShiftSample::new(1, 0.37, -0.41)];
    let trajectory = DriftTrajectory::fit(&samples, 0.0).unwrap();

    let corrected = apply_correction(&stack, &trajectory).read_frame(1).unwrap();
    assert_eq!(corrected.original_bit_depth, 8);
    for &v in corrected.data.iter() {
        let level = v * 255.0;
        assert!((level - level.round()).abs() < 1e-3, "value {v} is not an 8-bit level");
    }
}

#[test]
fn test_float_frames_not_quantized() {
    let stack = drifting_stack(2, 3.0, |i| (0.0, i as f64 * 0.5));
    let samples = vec![ShiftSample::new(0, 0.0, 0.0), ShiftSample::new(1, 0.0, 0.5)];
    let trajectory = DriftTrajectory::fit(&samples, 0.0).unwrap();
    let corrected = apply_correction(&stack, &trajectory).read_frame(1).unwrap();
    let off_grid = corrected
        .data
        .iter()
        .any(|&v| ((v * 255.0) - (v * 255.0).round()).abs() > 1e-3);
    assert!(off_grid);
}

#[test]
fn test_uncovered_border_filled_with_zero() {
    let frames = vec![
        Frame::new(Array2::from_elem((8, 8), 0.5), 32),
        Frame::new(Array2::from_elem((8, 8), 0.5), 32),
    ];
    let stack = MemoryStack::new(frames).unwrap();
    let samples = vec![ShiftSample::new(0, 0.0, 0.0), ShiftSample::new(1, 2.0, 0.0)];
    let trajectory = DriftTrajectory::fit(&samples, 0.0).unwrap();

    // Content drifted down by 2 rows; correction moves it back up.
    let corrected = apply_correction(&stack, &trajectory).read_frame(1).unwrap();
    assert_eq!(corrected.data[[0, 4]], 0.5);
    assert_eq!(corrected.data[[7, 4]], 0.0);
    assert_eq!(corrected.data[[6, 4]], 0.0);
}

#[test]
fn test_corrected_stack_reports_source_shape() {
    let stack = drifting_stack(3, 3.0, linear_drift);
    let trajectory = true_trajectory(3);
    let corrected = apply_correction(&stack, &trajectory);
    assert_eq!(corrected.frame_count(), 3);
    assert_eq!(corrected.dimensions(), (96, 96));
    assert_eq!(corrected.bit_depth(), 32);
    assert!(corrected.read_frame(3).is_err());
}
