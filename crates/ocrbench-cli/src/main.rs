//! ocrbench CLI

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ocrbench::{
    BenchConfig, BenchmarkEngine, Configuration, DirectoryDataset, FilterRegistry, MultiResult, ReaderRegistry,
    ResultCache,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Full results as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "ocrbench", version)]
#[command(about = "Benchmark OCR pipelines against a labeled image dataset", long_about = None)]
struct Cli {
    /// Config file (.toml, .yaml, .yml or .json); defaults to the nearest ocrbench.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one pipeline on a dataset sample
    Run {
        /// Reader name
        #[arg(short, long, default_value = "tesseract")]
        reader: String,

        /// Filter name, applied in the order given (repeatable)
        #[arg(short = 'f', long = "filter")]
        filters: Vec<String>,

        /// Number of dataset entries to evaluate
        #[arg(short = 'n', long)]
        sample_size: Option<usize>,

        /// Execute even when a cached result exists
        #[arg(long)]
        ignore_cache: bool,

        /// Dataset directory
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Result cache file
        #[arg(long)]
        cache: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run every pipeline listed in the config file and rank them
    Sweep {
        /// Execute even when cached results exist
        #[arg(long)]
        ignore_cache: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List available filters and readers
    List,

    /// Inspect or clear the result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache statistics
    Stats {
        /// Result cache file
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Remove every cached result
    Clear {
        /// Result cache file
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            reader,
            filters,
            sample_size,
            ignore_cache,
            dataset,
            cache,
            format,
        } => {
            let mut settings = settings;
            if let Some(sample_size) = sample_size {
                settings.sample_size = sample_size;
            }
            if let Some(dataset) = dataset {
                settings.dataset_dir = dataset;
            }
            if let Some(cache) = cache {
                settings.cache_path = cache;
            }
            settings.ignore_cache |= ignore_cache;
            settings.validate()?;

            let readers = build_readers(&settings)?;
            let config = Configuration::from_names(&reader, filters.as_slice(), &readers, &FilterRegistry::new())?;

            let mut engine = open_engine(&settings)?;
            let result = engine.run(&config, settings.sample_size, settings.ignore_cache)?;

            match format {
                OutputFormat::Text => print_summary(&result),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
            Ok(())
        }

        Commands::Sweep { ignore_cache, format } => {
            let mut settings = settings;
            settings.ignore_cache |= ignore_cache;
            settings.validate()?;

            if settings.pipelines.is_empty() {
                bail!("No pipelines configured; add [[pipelines]] entries to {}", ocrbench::core::config::CONFIG_FILE_NAME);
            }

            let readers = build_readers(&settings)?;
            let filters = FilterRegistry::new();
            let configs = settings
                .pipelines
                .iter()
                .map(|spec| spec.build(&readers, &filters))
                .collect::<ocrbench::Result<Vec<_>>>()?;

            let mut engine = open_engine(&settings)?;
            let mut results = Vec::with_capacity(configs.len());
            let mut failed = 0usize;
            for config in &configs {
                match engine.run(config, settings.sample_size, settings.ignore_cache) {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        tracing::error!("Pipeline '{}' failed: {}", config, e);
                        failed += 1;
                    }
                }
            }

            rank(&mut results);

            match format {
                OutputFormat::Text => print_ranking(&results),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            }

            if results.is_empty() {
                bail!("All {} pipelines failed", failed);
            }
            Ok(())
        }

        Commands::List => {
            let readers = build_readers(&settings)?;
            let filters = FilterRegistry::new();

            println!("Filters:");
            for name in filters.list() {
                println!("  {}", name);
            }

            println!("Readers:");
            let reader_names = readers.list();
            if reader_names.is_empty() {
                println!("  (none; build with --features tesseract)");
            }
            for name in reader_names {
                println!("  {}", name);
            }
            Ok(())
        }

        Commands::Cache { command } => match command {
            CacheCommands::Stats { cache } => {
                let path = cache.unwrap_or(settings.cache_path);
                let cache = ResultCache::load(&path);
                let stats = cache.stats();

                println!("Cache file: {}", path.display());
                println!("Entries:    {}", stats.entries);
                println!("Size:       {} bytes", stats.file_size_bytes);
                for (identity, result) in cache.iter() {
                    println!("  {:>7.2}%  {}", result.average_success() * 100.0, identity);
                }
                Ok(())
            }
            CacheCommands::Clear { cache } => {
                let path = cache.unwrap_or(settings.cache_path);
                let mut cache = ResultCache::load(&path);
                let removed = cache
                    .clear()
                    .with_context(|| format!("Failed to clear cache at {}", path.display()))?;
                println!("Removed {} cached result(s) from {}", removed, path.display());
                Ok(())
            }
        },
    }
}

/// Explicit config file, else the nearest `ocrbench.toml`, else defaults.
fn load_settings(path: Option<&Path>) -> Result<BenchConfig> {
    let settings = match path {
        Some(path) => BenchConfig::from_file(path)?,
        None => BenchConfig::discover()?.unwrap_or_default(),
    };
    Ok(settings)
}

#[cfg_attr(not(feature = "tesseract"), allow(unused_variables, unused_mut))]
fn build_readers(settings: &BenchConfig) -> Result<ReaderRegistry> {
    let mut readers = ReaderRegistry::new_empty();

    #[cfg(feature = "tesseract")]
    {
        use ocrbench::ocr::{TesseractConfig, TesseractReader};

        let config = settings
            .tesseract
            .as_ref()
            .map(TesseractConfig::from)
            .unwrap_or_default();
        readers.register(Arc::new(TesseractReader::new(config)))?;
    }

    Ok(readers)
}

fn open_engine(settings: &BenchConfig) -> Result<BenchmarkEngine> {
    let dataset = DirectoryDataset::load(&settings.dataset_dir)
        .with_context(|| format!("Failed to load dataset from {}", settings.dataset_dir.display()))?;
    if dataset.entries().is_empty() {
        tracing::warn!("Dataset at {} has no labeled images", settings.dataset_dir.display());
    }
    Ok(BenchmarkEngine::new(&settings.cache_path, Arc::new(dataset)))
}

/// Best average success first; ties broken by identity.
fn rank(results: &mut [MultiResult]) {
    results.sort_by(|a, b| {
        b.average_success()
            .total_cmp(&a.average_success())
            .then_with(|| a.identity().cmp(&b.identity()))
    });
}

fn print_summary(result: &MultiResult) {
    println!("Pipeline:        {}", result.identity());
    println!(
        "Entries:         {} ({} excluded)",
        result.results().len(),
        result.excluded().len()
    );
    println!("Average success: {:.2}%", result.average_success() * 100.0);
    println!("Average time:    {:.1} ms", result.average_time_ms());
    for excluded in result.excluded() {
        println!("  excluded {}: {}", excluded.entry_id, excluded.reason);
    }
}

fn print_ranking(results: &[MultiResult]) {
    println!("{:>8}  {:>10}  PIPELINE", "SUCCESS", "TIME (ms)");
    for result in results {
        println!(
            "{:>7.2}%  {:>10.1}  {}",
            result.average_success() * 100.0,
            result.average_time_ms(),
            result.identity()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrbench::{PipelineDescriptor, SingleResult};

    fn result(reader: &str, success: f64) -> MultiResult {
        MultiResult::aggregate(
            PipelineDescriptor::new(reader, vec![]),
            vec![SingleResult {
                entry_id: "a".to_string(),
                elapsed_ms: 1.0,
                success,
                lines: vec![],
                expected_text: "a".to_string(),
            }],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_rank_orders_by_success_then_identity() {
        let mut results = vec![result("b", 0.5), result("c", 0.9), result("a", 0.5)];
        rank(&mut results);
        let ids: Vec<String> = results.iter().map(|r| r.identity()).collect();
        assert_eq!(ids, vec!["c: ", "a: ", "b: "]);
    }

    #[test]
    fn test_cli_parses_repeated_filters() {
        let cli = Cli::try_parse_from([
            "ocrbench", "run", "--reader", "tesseract", "-f", "grayscale", "--filter", "sharpen", "-n", "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                reader,
                filters,
                sample_size,
                format,
                ..
            } => {
                assert_eq!(reader, "tesseract");
                assert_eq!(filters, vec!["grayscale", "sharpen"]);
                assert_eq!(sample_size, Some(3));
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected run"),
        }
    }
}
