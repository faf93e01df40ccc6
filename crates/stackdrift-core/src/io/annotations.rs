use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::frame::PointAnnotation;

/// Read point annotations from a CSV file with header `frame,x,y`.
///
/// Row order is preserved; it decides which annotation wins when several
/// share a frame index.
pub fn read_annotations(path: &Path) -> Result<Vec<PointAnnotation>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect(reader)
}

/// Read point annotations from any CSV byte stream.
pub fn read_annotations_from<R: Read>(input: R) -> Result<Vec<PointAnnotation>> {
    collect(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input))
}

fn collect<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<PointAnnotation>> {
    let mut annotations = Vec::new();
    for record in reader.deserialize() {
        let annotation: PointAnnotation = record?;
        annotations.push(annotation);
    }
    Ok(annotations)
}

/// Write point annotations as CSV with header `frame,x,y`.
pub fn write_annotations<W: Write>(output: W, annotations: &[PointAnnotation]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for annotation in annotations {
        writer.serialize(annotation)?;
    }
    writer.flush()?;
    Ok(())
}
