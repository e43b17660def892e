use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tracemerge_merge::{MergeConfig, MergeSession, SectionMergeState};
use tracemerge_store::{JsonSeriesStore, SeriesReader};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, &cli.format),
        Command::Merge(args) => cmd_merge(args, &cli.format),
    }
}

fn load_config(args: &SessionArgs) -> anyhow::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MergeConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    config.validate()?;
    Ok(config)
}

fn open_session(args: &SessionArgs) -> anyhow::Result<MergeSession> {
    let config = load_config(args)?;
    let series = JsonSeriesStore::new()
        .read_series(&args.series)
        .with_context(|| format!("reading {}", args.series.display()))?;
    Ok(MergeSession::new(series, config)?)
}

fn section_summary(state: &SectionMergeState) -> serde_json::Value {
    let categories = state.categories();
    json!({
        "name": state.name(),
        "contours": state.source().contours.len(),
        "unique": categories.unique.len(),
        "exact_duplicates": categories.exact_duplicates.len(),
        "potential_pairs": categories
            .potential_pairs
            .iter()
            .map(|p| [p.first, p.second])
            .collect::<Vec<_>>(),
    })
}

fn cmd_inspect(args: InspectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let session = open_session(&args.session)?;

    if matches!(format, OutputFormat::Json) {
        let report = json!({
            "series": session.name(),
            "threshold": session.config().threshold,
            "pending_conflicts": session.pending_conflicts(),
            "sections": session.sections().iter().map(section_summary).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Series {} ({} sections)",
        session.name().bold(),
        session.sections().len()
    );
    for state in session.sections() {
        let categories = state.categories();
        let marker = if categories.is_clean() {
            "✓".green()
        } else {
            "!".yellow().bold()
        };
        println!(
            "  {} {}  {} unique, {} exact, {} potential",
            marker,
            state.name(),
            categories.unique.len(),
            categories.exact_duplicates.len(),
            categories.potential_pairs.len(),
        );
        for pair in &categories.potential_pairs {
            let name = &state.source().contours[pair.first].name;
            println!(
                "      {} #{} / #{}",
                name.cyan(),
                pair.first,
                pair.second
            );
        }
    }

    let pending = session.pending_conflicts();
    if pending == 0 {
        println!("{} No conflicts.", "✓".green().bold());
    } else {
        println!("{} {} potential duplicate(s) need a choice.", "!".yellow().bold(), pending);
    }
    Ok(())
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut session = open_session(&args.session)?;
    tracing::debug!(policy = ?args.policy, output = %args.output_dir.display(), "merging");

    match args.policy.quick_merge() {
        Some(policy) => session.quick_merge_all(policy)?,
        None => {
            // Sections without conflicts resolve as-is; the rest keep source contours.
            session.series_mut().use_source();
            for index in 0..session.sections().len() {
                if let Some(state) = session.section_mut(index) {
                    if state.pending_count() == 0 {
                        state.resolve_contours()?;
                    }
                }
            }
        }
    }

    let store = if args.pretty {
        JsonSeriesStore::new().pretty()
    } else {
        JsonSeriesStore::new()
    };
    let path = session.write(&store, &args.output_dir)?;
    let (done, total) = session.progress();

    if matches!(format, OutputFormat::Json) {
        let report = json!({
            "path": path,
            "series": session.merged_name(),
            "resolved_states": done,
            "total_states": total,
            "unresolved": session.unresolved(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Wrote {} to {}",
        "✓".green().bold(),
        session.merged_name().bold(),
        path.display()
    );
    println!("  Resolved: {done}/{total} states");
    for name in session.unresolved() {
        println!("  {} {} (source values kept)", "unresolved:".yellow(), name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tracemerge_store::SeriesWriter;
    use tracemerge_types::{Contour, Section, Series, Shape};

    fn square(x: f64) -> Contour {
        Contour::new(
            "cell1",
            Shape::polygon([(x, 0.0), (x + 10.0, 0.0), (x + 10.0, 10.0), (x, 10.0)]),
        )
    }

    fn write_source(dir: &std::path::Path) -> std::path::PathBuf {
        let series = Series::new("brain.ser").with_sections(vec![
            Section::new("brain.1", 1).with_contours(vec![square(0.0), square(6.0)]),
            Section::new("brain.2", 2).with_contours(vec![square(0.0)]),
        ]);
        JsonSeriesStore::new().write_series(&series, dir).unwrap()
    }

    fn run(args: &[&str]) -> anyhow::Result<()> {
        run_command(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn inspect_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        run(&["tracemerge", "inspect", source.to_str().unwrap()]).unwrap();
        run(&["tracemerge", "--format", "json", "inspect", source.to_str().unwrap()]).unwrap();
    }

    #[test]
    fn merge_with_policy_writes_resolved_series() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let out = dir.path().join("out");
        run(&[
            "tracemerge",
            "merge",
            source.to_str().unwrap(),
            out.to_str().unwrap(),
            "--policy",
            "first",
        ])
        .unwrap();

        let merged = JsonSeriesStore::new()
            .read_series(&out.join("brainmerged.json"))
            .unwrap();
        assert_eq!(merged.sections[0].contours, vec![square(0.0)]);
        assert_eq!(merged.sections[1].contours.len(), 1);
    }

    #[test]
    fn source_policy_keeps_conflicted_sections() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let out = dir.path().join("out");
        run(&["tracemerge", "merge", source.to_str().unwrap(), out.to_str().unwrap()]).unwrap();

        let merged = JsonSeriesStore::new()
            .read_series(&out.join("brainmerged.json"))
            .unwrap();
        assert_eq!(merged.sections[0].contours.len(), 2);
    }

    #[test]
    fn threshold_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let err = run(&[
            "tracemerge",
            "inspect",
            source.to_str().unwrap(),
            "--threshold",
            "0.5",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn missing_source_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = run(&["tracemerge", "inspect", missing.to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
