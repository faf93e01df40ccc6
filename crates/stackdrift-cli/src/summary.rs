use console::Style;
use stackdrift_core::io::drift_table::DriftReport;
use stackdrift_core::pipeline::{PipelineConfig, PipelineOutput};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Drift Correction"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    match config.drift_table {
        Some(ref table) => println!(
            "  {:<14}{}",
            s.label.apply_to("Drift table"),
            s.path.apply_to(table.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Drift table"),
            s.disabled.apply_to("not written")
        ),
    }
    println!();

    let drift = &config.drift;
    println!("  {}", s.header.apply_to("Estimation"));
    match config.annotations {
        Some(ref points) => {
            println!(
                "    {:<16}{}",
                s.label.apply_to("Method"),
                s.method.apply_to("point annotations")
            );
            println!(
                "    {:<16}{}",
                s.label.apply_to("Annotations"),
                s.path.apply_to(points.display())
            );
            println!(
                "    {:<16}{}",
                s.label.apply_to("Duplicates"),
                s.value.apply_to(drift.duplicate_policy)
            );
        }
        None => {
            println!(
                "    {:<16}{}",
                s.label.apply_to("Method"),
                s.method.apply_to("phase correlation")
            );
            println!(
                "    {:<16}{}",
                s.label.apply_to("Upsampling"),
                s.value.apply_to(format!("{}x", drift.upsample_factor))
            );
            if drift.prefilter_sigma > 0.0 {
                println!(
                    "    {:<16}{}",
                    s.label.apply_to("Prefilter"),
                    s.value.apply_to(format!("sigma {}", drift.prefilter_sigma))
                );
            } else {
                println!(
                    "    {:<16}{}",
                    s.label.apply_to("Prefilter"),
                    s.disabled.apply_to("disabled")
                );
            }
            println!(
                "    {:<16}{}",
                s.label.apply_to("Update every"),
                s.value.apply_to(format!("{} frames", drift.update_threshold))
            );
        }
    }
    println!();

    println!("  {}", s.header.apply_to("Trajectory"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("Smoothing"),
        s.value.apply_to(drift.smoothing_factor)
    );
    println!();
}

pub fn print_result_summary(config: &PipelineConfig, output: &PipelineOutput) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(output.method)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(output.frames_written)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Max drift"),
        s.value.apply_to(format!("{:.2} px", output.report.max_drift()))
    );
    if let Some(ref estimates) = output.estimates {
        if let (Some(mean), Some(max)) = (estimates.mean_error(), estimates.max_error()) {
            println!(
                "    {:<16}{}",
                s.label.apply_to("Reg. error"),
                s.value.apply_to(format!("mean {mean:.4}, max {max:.4}"))
            );
        }
        println!(
            "    {:<16}{}",
            s.label.apply_to("Ref. updates"),
            s.value.apply_to(estimates.reference_updates.len())
        );
    }
    println!(
        "    {:<16}{}",
        s.label.apply_to("Saved to"),
        s.path.apply_to(config.output.display())
    );
    println!();
}

pub fn print_drift_table(report: &DriftReport) {
    let s = Styles::new();
    let fmt_opt = |v: Option<f64>, digits: usize| match v {
        Some(v) => format!("{v:.digits$}"),
        None => "-".to_string(),
    };

    println!(
        "{}",
        s.header.apply_to(format!(
            "{:>6} {:>9} {:>9} {:>9} {:>9} {:>8}",
            "frame", "raw_dy", "raw_dx", "dy", "dx", "error"
        ))
    );
    for row in &report.rows {
        println!(
            "{:>6} {:>9} {:>9} {:>9} {:>9} {:>8}",
            row.frame,
            fmt_opt(row.raw_dy, 3),
            fmt_opt(row.raw_dx, 3),
            s.value.apply_to(format!("{:.3}", row.dy)),
            s.value.apply_to(format!("{:.3}", row.dx)),
            fmt_opt(row.error, 4),
        );
    }
}
