use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::drift::ShiftEstimates;
use crate::error::Result;
use crate::frame::ShiftSample;
use crate::trajectory::DriftTrajectory;

/// One line of the drift table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftRow {
    pub frame: usize,
    /// Raw measured drift, absent for frames without a sample.
    pub raw_dy: Option<f64>,
    pub raw_dx: Option<f64>,
    /// Fitted drift.
    pub dy: f64,
    pub dx: f64,
    /// Registration error, phase correlation only.
    pub error: Option<f64>,
}

/// Fitted drift at every frame alongside the raw samples it was fitted to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriftReport {
    pub rows: Vec<DriftRow>,
}

impl DriftReport {
    pub fn new(trajectory: &DriftTrajectory, frame_count: usize, raw: &[ShiftSample]) -> Self {
        let raw: BTreeMap<usize, &ShiftSample> = raw.iter().map(|s| (s.frame_index, s)).collect();
        let rows = trajectory
            .sample_frames(frame_count)
            .into_iter()
            .map(|fitted| {
                let sample = raw.get(&fitted.frame_index);
                DriftRow {
                    frame: fitted.frame_index,
                    raw_dy: sample.map(|s| s.dy),
                    raw_dx: sample.map(|s| s.dx),
                    dy: fitted.dy,
                    dx: fitted.dx,
                    error: None,
                }
            })
            .collect();
        Self { rows }
    }

    /// Report for a phase-correlation run, including registration errors.
    pub fn from_estimates(
        trajectory: &DriftTrajectory,
        frame_count: usize,
        estimates: &ShiftEstimates,
    ) -> Self {
        let mut report = Self::new(trajectory, frame_count, &estimates.samples);
        for row in &mut report.rows {
            row.error = estimates.error_at(row.frame);
        }
        report
    }

    /// Largest fitted drift magnitude over all frames.
    pub fn max_drift(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.dy.hypot(r.dx))
            .fold(0.0, f64::max)
    }

    pub fn write_to<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(output);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(input);
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<DriftRow>, csv::Error>>()?;
        Ok(Self { rows })
    }
}

/// Write a drift table as CSV with header `frame,raw_dy,raw_dx,dy,dx,error`.
pub fn write_drift_table(path: &Path, report: &DriftReport) -> Result<()> {
    let file = std::fs::File::create(path)?;
    report.write_to(std::io::BufWriter::new(file))
}

pub fn read_drift_table(path: &Path) -> Result<DriftReport> {
    DriftReport::read_from(std::fs::File::open(path)?)
}
