use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use vic3report::reports::compare::{self, Metric};
use vic3report::reports::{blocs, buildings, effective, entities, foreign, subjects, totals};
use vic3report::{render, Analysis, OutputFormat, Report};
use vic3save::gdp::GdpSource;
use vic3save::humans::{HumanFilter, DEFAULT_HUMANS_FILE};
use vic3save::save::{latest_save, load_save};

#[derive(Parser)]
#[command(name = "vic3report", version)]
#[command(about = "Foreign ownership, GDP and power bloc reports for extracted Victoria 3 saves")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report on countries listed in the humans file
    #[arg(long, global = true)]
    humans: bool,

    /// One country tag per line; `#` starts a comment line
    #[arg(long, global = true, env = "VIC3_HUMANS_FILE", default_value = DEFAULT_HUMANS_FILE)]
    humans_file: PathBuf,

    /// Where to look for the newest save when none is given
    #[arg(long, global = true, env = "VIC3_SAVES_DIR", default_value = "extracted-saves")]
    saves_dir: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write report to file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// GDP figure used for percentages and totals [default: credit for
    /// effective-gdp and compare, stored otherwise]
    #[arg(long, global = true, value_enum)]
    gdp: Option<GdpArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GdpArg {
    /// Latest value of the game's GDP series
    Stored,
    /// Reconstructed from each country's credit limit
    Credit,
}

impl From<GdpArg> for GdpSource {
    fn from(arg: GdpArg) -> Self {
        match arg {
            GdpArg::Stored => GdpSource::Stored,
            GdpArg::Credit => GdpSource::Credit,
        }
    }
}

#[derive(Args)]
struct SaveInput {
    /// Extracted save (JSON). Defaults to the newest *_extracted.json in --saves-dir
    save_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Value invested abroad and foreign-owned within, against GDP
    Foreign {
        #[command(flatten)]
        input: SaveInput,

        /// Counterparts listed per country
        #[arg(long, default_value_t = foreign::DEFAULT_TOP)]
        top: usize,
    },

    /// Foreign building levels by owning entity type
    Entities {
        #[command(flatten)]
        input: SaveInput,

        /// Show every foreign owner inside this country instead
        #[arg(short, long)]
        country: Option<String>,
    },

    /// Foreign building levels by building type
    Buildings {
        #[command(flatten)]
        input: SaveInput,
    },

    /// Building levels owned abroad and foreign-owned within
    Totals {
        #[command(flatten)]
        input: SaveInput,
    },

    /// GDP controlled at home and abroad
    EffectiveGdp {
        #[command(flatten)]
        input: SaveInput,
    },

    /// Power blocs and their members
    Blocs {
        #[command(flatten)]
        input: SaveInput,
    },

    /// Overlords with their direct and indirect subjects
    Subjects {
        #[command(flatten)]
        input: SaveInput,
    },

    /// Per-country change in a metric between two saves
    Compare {
        /// Earlier extracted save
        first: PathBuf,

        /// Later extracted save
        second: PathBuf,

        /// Metric to compare
        #[arg(short, long, value_enum, default_value_t = Metric::Gdp)]
        metric: Metric,
    },
}

impl Commands {
    /// The single save a report reads; `None` means the newest in --saves-dir.
    fn save_file(&self) -> Option<&Path> {
        match self {
            Commands::Foreign { input, .. }
            | Commands::Entities { input, .. }
            | Commands::Buildings { input }
            | Commands::Totals { input }
            | Commands::EffectiveGdp { input }
            | Commands::Blocs { input }
            | Commands::Subjects { input } => input.save_file.as_deref(),
            Commands::Compare { .. } => None,
        }
    }

    /// Effective GDP is measured against the credit-derived figure.
    fn default_gdp(&self) -> GdpArg {
        match self {
            Commands::EffectiveGdp { .. } | Commands::Compare { .. } => GdpArg::Credit,
            _ => GdpArg::Stored,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let gdp: GdpSource = cli.gdp.unwrap_or_else(|| cli.command.default_gdp()).into();
    let humans = load_humans(&cli)?;

    let single = || -> Result<Analysis> {
        let path = match cli.command.save_file() {
            Some(path) => path.to_path_buf(),
            None => {
                let path = latest_save(&cli.saves_dir)?;
                log::info!("Using latest save: {}", path.display());
                path
            }
        };
        load_analysis(&path, gdp, humans.clone())
    };

    match &cli.command {
        Commands::Foreign { top, .. } => emit(&cli, &foreign::build(&single()?, *top)),
        Commands::Entities { country, .. } => {
            let focus = country.as_deref().map(str::to_uppercase);
            emit(&cli, &entities::build(&single()?, focus.as_deref())?)
        }
        Commands::Buildings { .. } => emit(&cli, &buildings::build(&single()?)),
        Commands::Totals { .. } => emit(&cli, &totals::build(&single()?)),
        Commands::EffectiveGdp { .. } => emit(&cli, &effective::build(&single()?)),
        Commands::Blocs { .. } => emit(&cli, &blocs::build(&single()?)),
        Commands::Subjects { .. } => emit(&cli, &subjects::build(&single()?)),
        Commands::Compare {
            first,
            second,
            metric,
        } => {
            let before = load_analysis(first, gdp, humans.clone())?;
            let after = load_analysis(second, gdp, humans.clone())?;
            let report = compare::build(
                *metric,
                (&compare::session_label(first), &before),
                (&compare::session_label(second), &after),
            );
            emit(&cli, &report)
        }
    }
}

fn load_analysis(path: &Path, gdp: GdpSource, humans: Option<HumanFilter>) -> Result<Analysis> {
    let doc =
        load_save(path).with_context(|| format!("Failed to load save {}", path.display()))?;
    Ok(Analysis::new(doc, gdp, humans))
}

fn load_humans(cli: &Cli) -> Result<Option<HumanFilter>> {
    if !cli.humans {
        return Ok(None);
    }
    if !cli.humans_file.exists() {
        log::warn!(
            "Humans file {} not found, reporting on all countries",
            cli.humans_file.display()
        );
        return Ok(None);
    }

    let filter = HumanFilter::load(&cli.humans_file)
        .with_context(|| format!("Failed to read {}", cli.humans_file.display()))?;
    if filter.is_empty() {
        log::warn!("Humans file lists no countries, reporting on all countries");
    }
    Ok(Some(filter))
}

fn emit<R: Report>(cli: &Cli, report: &R) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(path) = &cli.output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(std::io::stdout().lock())
    };

    render(report, cli.format, &mut writer)?;
    writer.flush()?;

    if let Some(path) = &cli.output {
        log::info!("Report written to: {}", path.display());
    }
    Ok(())
}
