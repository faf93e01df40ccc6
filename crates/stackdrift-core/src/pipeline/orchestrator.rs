use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::consts::CORRECTION_CHUNK_FRAMES;
use crate::correct::apply_correction;
use crate::drift::{estimate_shifts_reported, DriftEstimator, PointTrackEstimator};
use crate::error::Result;
use crate::io::annotations::read_annotations;
use crate::io::drift_table::{write_drift_table, DriftReport};
use crate::io::image_io::write_image_sequence;
use crate::io::ser::SerHeader;
use crate::io::ser_writer::SerWriter;
use crate::io::tiff_stack::{is_tiff_path, TiffStackWriter};
use crate::io::FrameSource;
use crate::trajectory::DriftTrajectory;

use super::config::PipelineConfig;
use super::input::StackInput;
use super::types::{
    EstimationMethod, NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter,
};

/// Run estimation and correction with a thread-safe progress reporter.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput> {
    config.validate()?;

    reporter.begin_stage(PipelineStage::Reading, None);
    let input = StackInput::open(&config.input)?;
    let total = input.frame_count();
    let (height, width) = input.dimensions();
    info!(
        total_frames = total,
        width,
        height,
        bit_depth = input.bit_depth(),
        "Opened input stack"
    );
    reporter.finish_stage();

    let (method, samples, estimates) = match &config.annotations {
        Some(path) => {
            let annotations = read_annotations(path)?;
            let samples = PointTrackEstimator::new(&annotations, &config.drift).samples()?;
            (EstimationMethod::Points, samples, None)
        }
        None => {
            reporter.begin_stage(PipelineStage::Estimating, Some(total.saturating_sub(1)));
            let estimates =
                estimate_shifts_reported(&input, &config.drift, |done| reporter.advance(done))?;
            reporter.finish_stage();
            (
                EstimationMethod::PhaseCorrelation,
                estimates.samples.clone(),
                Some(estimates),
            )
        }
    };

    reporter.begin_stage(PipelineStage::Fitting, None);
    let trajectory = DriftTrajectory::fit(&samples, config.drift.smoothing_factor)?;
    reporter.finish_stage();

    let report = match &estimates {
        Some(estimates) => DriftReport::from_estimates(&trajectory, total, estimates),
        None => DriftReport::new(&trajectory, total, &samples),
    };
    info!(
        method = %method,
        max_drift = report.max_drift(),
        "Drift trajectory fitted"
    );

    let frames_written = write_corrected(
        &input,
        &trajectory,
        &config.output,
        &config.sequence_extension,
        reporter.as_ref(),
    )?;

    if let Some(table) = &config.drift_table {
        reporter.begin_stage(PipelineStage::Writing, None);
        write_drift_table(table, &report)?;
        info!(path = %table.display(), "Drift table written");
        reporter.finish_stage();
    }

    Ok(PipelineOutput {
        method,
        trajectory,
        report,
        estimates,
        frames_written,
    })
}

/// Run estimation and correction without progress reporting.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    run_pipeline_reported(config, Arc::new(NoOpReporter))
}

/// Correct every frame of `source` and write the result to `output`.
///
/// A `.ser` output keeps the source bit depth (float sources are written as
/// 16-bit). A `.tif`/`.tiff` path that is not an existing directory becomes
/// a multi-page 16-bit TIFF. Anything else is a directory of numbered images
/// with the given extension. Returns the number of frames written.
pub fn write_corrected<S: FrameSource + Sync + ?Sized>(
    source: &S,
    trajectory: &DriftTrajectory,
    output: &Path,
    extension: &str,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    let total = source.frame_count();
    let corrected = apply_correction(source, trajectory);
    reporter.begin_stage(PipelineStage::Correcting, Some(total));

    let written = if is_ser_path(output) {
        let (height, width) = source.dimensions();
        let depth = if source.bit_depth() > 16 {
            16
        } else {
            source.bit_depth()
        };
        let header = SerHeader::mono(width as u32, height as u32, depth as u32, total as u32);
        let mut writer = SerWriter::create(output, &header)?;
        for chunk in corrected.chunks(CORRECTION_CHUNK_FRAMES) {
            for frame in chunk? {
                writer.write_frame(&frame)?;
            }
            reporter.advance(writer.frames_written());
        }
        let written = writer.frames_written();
        writer.finalize()?;
        written
    } else if is_tiff_path(output) && !output.is_dir() {
        let (height, width) = source.dimensions();
        let mut writer = TiffStackWriter::create(output, height, width)?;
        for chunk in corrected.chunks(CORRECTION_CHUNK_FRAMES) {
            for frame in chunk? {
                writer.write_frame(&frame)?;
            }
            reporter.advance(writer.frames_written());
        }
        writer.frames_written()
    } else {
        let mut done = 0;
        let frames = corrected
            .chunks(CORRECTION_CHUNK_FRAMES)
            .flat_map(|chunk| match chunk {
                Ok(frames) => frames.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
            .inspect(|_| {
                done += 1;
                reporter.advance(done);
            });
        write_image_sequence(output, frames, extension)?
    };

    reporter.finish_stage();
    info!(frames = written, path = %output.display(), "Corrected stack written");
    Ok(written)
}

fn is_ser_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"))
}
