use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stackdrift_core::pipeline::StackInput;

#[derive(Args)]
pub struct InfoArgs {
    /// SER file, multi-page TIFF, or directory of TIFF/PNG frames
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let stack = StackInput::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let info = stack.source_info(&args.input);

    let (kind, bytes_per_frame) = match &stack {
        StackInput::Ser(reader) => ("SER video", Some(reader.header.frame_byte_size())),
        StackInput::Tiff(_) => ("multi-page TIFF", None),
        StackInput::Images(_) => ("image sequence", None),
    };

    println!("Stack:       {}", info.filename.display());
    println!("Kind:        {kind}");
    println!("Frames:      {}", info.total_frames);
    println!("Size:        {}x{} px", info.width, info.height);
    match info.bit_depth {
        32 => println!("Samples:     32-bit float"),
        depth => println!("Samples:     {depth}-bit integer"),
    }

    for (label, value) in [
        ("Observer", &info.observer),
        ("Telescope", &info.telescope),
        ("Instrument", &info.instrument),
    ] {
        if let Some(value) = value {
            println!("{:<13}{value}", format!("{label}:"));
        }
    }

    if let Some(bytes) = bytes_per_frame {
        let mib = (bytes * info.total_frames) as f64 / (1024.0 * 1024.0);
        println!("Payload:     {mib:.1} MiB");
    }

    Ok(())
}
