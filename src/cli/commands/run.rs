use anyhow::Result;
use clap::Args;

use super::{PipelineFlags, load_config};
use crate::archive::discover_archives;
use crate::cli::Output;
use crate::error::PipelineError;
use crate::parallel::StrategyKind;
use crate::pipeline::Pipeline;
use crate::record::XmlRecordParser;
use crate::tables::TableWriter;

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub pipeline: PipelineFlags,

    /// Concurrency strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Path of the id/level table
    #[arg(long)]
    pub level_table: Option<String>,

    /// Path of the id/object table
    #[arg(long)]
    pub object_table: Option<String>,
}

pub fn execute(args: RunArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let settings = load_config(custom_config, &args.pipeline)?
        .with_override("pipeline.strategy", args.strategy)
        .with_override("output.level_table", args.level_table)
        .with_override("output.object_table", args.object_table)
        .settings()?;

    let archives = discover_archives(&settings.input_dir(), &settings.input.extension)?;
    if archives.is_empty() {
        output.warning(&format!(
            "No .{} archives found in {}",
            settings.input.extension, settings.input.directory
        ));
    }

    let strategy = settings.strategy();
    output.step(&format!(
        "Merging {} archives with the {} strategy ({} workers)",
        archives.len(),
        strategy.kind(),
        settings.workers()
    ));

    let pipeline = Pipeline::new(strategy, XmlRecordParser::new())
        .with_progress(settings.progress.enabled && !output.is_quiet());
    let writer = TableWriter::new(&settings.output.level_table, &settings.output.object_table);

    let report = match pipeline.run_to_tables(&archives, &writer) {
        Ok(report) => report,
        Err(err) => {
            report_failure(&err, output);
            return Err(err.into());
        }
    };

    output.success(&format!(
        "Merged {} records in {:.3}s",
        report.records,
        report.elapsed.as_secs_f64()
    ));
    output.key_value("Strategy", &report.strategy.to_string(), false);
    output.key_value("Archives", &report.archives.to_string(), false);
    output.key_value("Chunks", &report.chunks.to_string(), false);
    output.key_value(
        "Level table",
        &format!("{} ({} rows)", writer.level_path().display(), report.tables.level_rows),
        true,
    );
    output.key_value(
        "Object table",
        &format!("{} ({} rows)", writer.object_path().display(), report.tables.object_rows),
        true,
    );
    Ok(())
}

/// Name the failing archive and the failure class before the error chain is printed
pub(crate) fn report_failure(err: &PipelineError, output: &Output) {
    match err.archive() {
        Some(archive) => output.error(&format!("Run aborted [{}] while reading {archive}", err.kind())),
        None => output.error(&format!("Run aborted [{}]", err.kind())),
    }
    output.verbose("No tables were written");
}
