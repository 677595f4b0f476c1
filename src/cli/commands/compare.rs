use anyhow::{Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::run::report_failure;
use super::{PipelineFlags, load_config};
use crate::archive::discover_archives;
use crate::cli::Output;
use crate::parallel::{MergedResult, StrategyKind};
use crate::pipeline::Pipeline;
use crate::record::{Record, XmlRecordParser};
use crate::tables::TableWriter;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub pipeline: PipelineFlags,

    /// Runs per strategy; the best time is reported
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Directory for the per-strategy tables
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub fn execute(args: CompareArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let settings = load_config(custom_config, &args.pipeline)?.settings()?;
    let archives = discover_archives(&settings.input_dir(), &settings.input.extension)?;
    std::fs::create_dir_all(&args.out_dir)?;

    output.header(&format!(
        "Comparing strategies on {} archives ({} workers, best of {})",
        archives.len(),
        settings.workers(),
        args.repeat
    ));

    let mut baseline: Option<Vec<Record>> = None;
    for kind in StrategyKind::ALL {
        let pipeline = Pipeline::new(settings.strategy_for(kind), XmlRecordParser::new());

        let mut best = Duration::MAX;
        let mut merged = MergedResult::new();
        for round in 0..args.repeat {
            let start = Instant::now();
            merged = pipeline.run(&archives).inspect_err(|err| report_failure(err, output))?;
            best = best.min(start.elapsed());
            tracing::debug!("{kind} round {round}: {:?}", start.elapsed());
        }

        let writer = TableWriter::new(
            suffixed(&args.out_dir, &settings.output.level_table, kind),
            suffixed(&args.out_dir, &settings.output.object_table, kind),
        );
        writer.write(merged.records())?;

        let canonical = merged.canonical();
        let matches = match &baseline {
            Some(expected) => *expected == canonical,
            None => {
                baseline = Some(canonical);
                true
            }
        };

        output.action_result(
            &format!("{kind:<10}"),
            &format!(
                "{:.3}s  {} records  -> {}",
                best.as_secs_f64(),
                merged.len(),
                writer.level_path().display()
            ),
            matches,
        );
        if !matches {
            bail!("{kind} strategy produced different records than the sequential baseline");
        }
    }

    output.success("All strategies produced the same records");
    Ok(())
}

/// `id-level.csv` becomes `<dir>/id-level-pool.csv` for the pool strategy
fn suffixed(dir: &Path, table: &str, kind: StrategyKind) -> PathBuf {
    let table = Path::new(table);
    let stem = table.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match table.extension() {
        Some(ext) => format!("{stem}-{}.{}", kind.suffix(), ext.to_string_lossy()),
        None => format!("{stem}-{}", kind.suffix()),
    };
    dir.join(name)
}
