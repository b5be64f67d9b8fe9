use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{
    MalformedPolicy, RatingsSummary, RecordCleaner, RejectionTally, SourceOptions, parser,
};
use pipeline::{PipelineConfig, RatingsProcessor, export, profiles};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Threshold used for either axis when neither a flag nor a config file sets it
const DEFAULT_MIN_RATINGS: u32 = 5;

/// ratings-prep - prepare rating data for recommendation models
#[derive(Parser)]
#[command(name = "ratings-prep")]
#[command(about = "Filter sparse users/items and build dense interaction data", long_about = None)]
struct Cli {
    /// Ratings file to read
    #[arg(short, long, default_value = "data/raw/Ratings.csv")]
    input: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Field delimiter (single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Treat the file as headerless `user, item, rating` columns
    #[arg(long)]
    no_header: bool,

    #[arg(long, default_value = "User-ID")]
    user_column: String,

    #[arg(long, default_value = "ISBN")]
    item_column: String,

    #[arg(long, default_value = "Book-Rating")]
    rating_column: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, filter and index the ratings, then write the outputs
    Process {
        /// Directory to write outputs into
        #[arg(short, long, default_value = "data/processed")]
        output: PathBuf,

        /// JSON pipeline configuration (flags below override it)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimum ratings per user
        #[arg(long)]
        min_user_ratings: Option<u32>,

        /// Minimum ratings per item
        #[arg(long)]
        min_item_ratings: Option<u32>,

        /// Skip rows with the wrong number of fields instead of failing
        #[arg(long)]
        skip_malformed: bool,

        /// Also write per-user profiles and per-item statistics
        #[arg(long)]
        profiles: bool,
    },

    /// Show basic statistics about the ratings file
    Inspect,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = source_options(&cli.source)?;

    match cli.command {
        Commands::Process {
            output,
            config,
            min_user_ratings,
            min_item_ratings,
            skip_malformed,
            profiles,
        } => {
            let config = build_config(
                config.as_deref(),
                min_user_ratings,
                min_item_ratings,
                skip_malformed,
            )?;
            handle_process(&cli.input, &options, config, &output, profiles)?
        }
        Commands::Inspect => handle_inspect(&cli.input, &options)?,
    }

    Ok(())
}

fn source_options(args: &SourceArgs) -> Result<SourceOptions> {
    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got {:?}", args.delimiter);
    }
    Ok(SourceOptions {
        delimiter: args.delimiter as u8,
        has_header: !args.no_header,
        user_column: args.user_column.clone(),
        item_column: args.item_column.clone(),
        rating_column: args.rating_column.clone(),
    })
}

/// Merge the optional config file with command line overrides
fn build_config(
    path: Option<&Path>,
    min_user_ratings: Option<u32>,
    min_item_ratings: Option<u32>,
    skip_malformed: bool,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::new(DEFAULT_MIN_RATINGS, DEFAULT_MIN_RATINGS),
    };

    if let Some(min) = min_user_ratings {
        config.min_user_ratings = min;
    }
    if let Some(min) = min_item_ratings {
        config.min_item_ratings = min;
    }
    if skip_malformed {
        config.malformed_policy = MalformedPolicy::Skip;
    }
    Ok(config)
}

/// Handle the 'process' command
fn handle_process(
    input: &Path,
    options: &SourceOptions,
    config: PipelineConfig,
    output: &Path,
    with_profiles: bool,
) -> Result<()> {
    let start = Instant::now();
    tracing::debug!("Pipeline config: {:?}", config);
    let file = parser::read_ratings(input, options)
        .with_context(|| format!("Failed to read ratings from {}", input.display()))?;

    let processor = RatingsProcessor::new(config);
    let processed = processor
        .process_rows(&file.rows, file.schema)
        .context("Pipeline failed")?;

    let mut written = export::write_outputs(output, &processed)
        .with_context(|| format!("Failed to write outputs to {}", output.display()))?;

    if with_profiles {
        let users = profiles::user_profiles(&processed.filtered);
        let items = profiles::item_stats(&processed.filtered);
        written.extend(export::write_profiles(output, &users, &items)?);
    }

    let report = &processed.report;
    println!("{}", "Ratings prepared:".bold().blue());
    println!(
        "{}Thresholds: {} per user, {} per item",
        "• ".green(),
        report.min_user_ratings,
        report.min_item_ratings
    );
    println!(
        "{}Rows: {} read, {} accepted",
        "• ".green(),
        report.rows_seen,
        report.accepted
    );
    print_rejections(&report.rejected);
    println!(
        "{}Filter: {} passes, {} dropped, {} kept",
        "• ".cyan(),
        report.filter_passes,
        report.dropped_by_filter,
        report.surviving
    );
    println!(
        "{}Matrix: {} users x {} items",
        "• ".cyan(),
        report.shape.n_users,
        report.shape.n_items
    );

    if report.is_empty_result() {
        println!(
            "{} No ratings survived filtering; lower the thresholds",
            "!".yellow().bold()
        );
    }

    for path in &written {
        println!("  - {}", path.display());
    }
    println!("{} Done in {:?}", "✓".green(), start.elapsed());
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(input: &Path, options: &SourceOptions) -> Result<()> {
    let file = parser::read_ratings(input, options)
        .with_context(|| format!("Failed to read ratings from {}", input.display()))?;
    let cleaner = RecordCleaner::new(file.schema, MalformedPolicy::Skip);
    let batch = cleaner.clean_all(&file.rows)?;
    let summary = RatingsSummary::from_triples(&batch.triples);

    println!("{}", format!("Ratings in {}:", input.display()).bold().blue());
    println!("{}Rows: {}", "• ".green(), batch.rows_seen);
    println!("{}Clean ratings: {}", "• ".green(), summary.count);
    println!("{}Unique users: {}", "• ".green(), summary.unique_users);
    println!("{}Unique items: {}", "• ".green(), summary.unique_items);
    match summary.rating_range {
        Some((lo, hi)) => println!("{}Rating range: {} - {}", "• ".green(), lo, hi),
        None => println!("{}Rating range: n/a", "• ".green()),
    }
    print_rejections(&batch.rejected);
    Ok(())
}

fn print_rejections(tally: &RejectionTally) {
    if tally.total() == 0 {
        return;
    }
    println!("{}Rejected: {}", "• ".yellow(), tally.total());
    let reasons = [
        ("missing user", tally.missing_user),
        ("missing item", tally.missing_item),
        ("missing rating", tally.missing_rating),
        ("invalid rating", tally.invalid_rating),
        ("malformed", tally.malformed),
    ];
    for (label, count) in reasons.iter().filter(|(_, count)| *count > 0) {
        println!("    {}: {}", label, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(None, Some(3), None, true).unwrap();
        assert_eq!(config.min_user_ratings, 3);
        assert_eq!(config.min_item_ratings, DEFAULT_MIN_RATINGS);
        assert_eq!(config.malformed_policy, MalformedPolicy::Skip);
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let args = SourceArgs {
            delimiter: '§',
            no_header: false,
            user_column: "User-ID".to_string(),
            item_column: "ISBN".to_string(),
            rating_column: "Book-Rating".to_string(),
        };
        assert!(source_options(&args).is_err());
    }

    #[test]
    fn test_cli_parses_process() {
        let cli = Cli::try_parse_from([
            "ratings-prep",
            "--input",
            "r.csv",
            "--delimiter",
            ";",
            "process",
            "--min-user-ratings",
            "10",
            "--skip-malformed",
        ])
        .unwrap();
        assert_eq!(cli.source.delimiter, ';');
        match cli.command {
            Commands::Process { min_user_ratings, skip_malformed, .. } => {
                assert_eq!(min_user_ratings, Some(10));
                assert!(skip_malformed);
            }
            Commands::Inspect => panic!("expected process"),
        }
    }
}
