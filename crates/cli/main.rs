use config::Config;
use rental::aggregate::AggregateRow;
use rental::record::{CASUAL, REGISTERED, TOTAL};
use rental::{AggregateTable, Dataset, DateRange, Metrics, Report};
use ui::data::{DashboardData, DashboardSource, Point, SeasonBar};

use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use env_logger::Env;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process;

use log::{debug, error, info};

enum OutputType {
    Csv,
    Table,
    Polar,
    Json,
}

impl OutputType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(OutputType::Csv),
            "table" => Some(OutputType::Table),
            "polar" => Some(OutputType::Polar),
            "json" => Some(OutputType::Json),
            _ => None,
        }
    }
}

trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

/// Prints every aggregate frame to stdout.
struct PolarOutput {
    report: Report,
}

impl Output for PolarOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let metrics = self.report.metrics()?;
        println!(
            "{} .. {}: total {}, casual {}, registered {}",
            self.report.range.start(),
            self.report.range.end(),
            metrics.total,
            metrics.casual,
            metrics.registered
        );
        for table in self.report.tables() {
            println!("{}\n{}", table.name(), table.frame());
        }
        Ok(())
    }
}

/// Writes one csv file per aggregate into `dir`.
struct CsvOutput {
    dir: PathBuf,
    report: Report,
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.dir)?;
        for table in self.report.tables() {
            let path = self.dir.join(format!("{}.csv", table.name()));
            let mut file = File::create(&path)?;
            let mut df = table.frame().clone();
            CsvWriter::new(&mut file).finish(&mut df)?;
            info!("CSV file written successfully: {}", path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonReport {
    range: DateRange,
    metrics: Metrics,
    tables: BTreeMap<&'static str, Vec<AggregateRow>>,
}

impl JsonReport {
    fn new(report: &Report) -> Result<Self, Box<dyn Error>> {
        let mut tables = BTreeMap::new();
        for table in report.tables() {
            tables.insert(table.name(), table.rows()?);
        }
        Ok(JsonReport {
            range: report.range,
            metrics: report.metrics()?,
            tables,
        })
    }
}

struct JsonOutput {
    report: Report,
}

impl Output for JsonOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(&JsonReport::new(&self.report)?)?;
        println!("{}", json);
        Ok(())
    }
}

/// Interactive dashboard; recomputes the report on every range change.
struct TableOutput {
    dataset: Dataset,
    range: DateRange,
}

impl Output for TableOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let source = RentalSource::new(&self.dataset)?;
        ui::tui::run(source, self.range.start(), self.range.end())
    }
}

struct RentalSource<'a> {
    dataset: &'a Dataset,
    bounds: DateRange,
}

impl<'a> RentalSource<'a> {
    fn new(dataset: &'a Dataset) -> Result<Self, Box<dyn Error>> {
        let bounds = dataset.bounds().ok_or("dataset is empty")?;
        Ok(RentalSource { dataset, bounds })
    }
}

impl DashboardSource for RentalSource<'_> {
    fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.bounds.start(), self.bounds.end())
    }

    fn snapshot(&self, start: NaiveDate, end: NaiveDate) -> Result<DashboardData, Box<dyn Error>> {
        let range = self.dataset.range(start, end)?;
        let report = self.dataset.report(&range)?;
        dashboard_data(&report)
    }
}

fn count(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

fn points(table: &AggregateTable, measure: &str) -> Result<Vec<Point>, Box<dyn Error>> {
    let labels = table.labels()?;
    let values = table.values(measure)?;
    Ok(labels
        .into_iter()
        .zip(values)
        .map(|(label, value)| Point::new(label, count(value)))
        .collect())
}

fn dashboard_data(report: &Report) -> Result<DashboardData, Box<dyn Error>> {
    let metrics = report.metrics()?;

    let seasons = report
        .season_split
        .labels()?
        .into_iter()
        .zip(report.season_split.values(REGISTERED)?)
        .zip(report.season_split.values(CASUAL)?)
        .map(|((season, registered), casual)| SeasonBar {
            season,
            registered: count(registered),
            casual: count(casual),
        })
        .collect();

    Ok(DashboardData {
        start: report.range.start(),
        end: report.range.end(),
        metrics: ui::data::Metrics {
            total: count(metrics.total),
            casual: count(metrics.casual),
            registered: count(metrics.registered),
        },
        daily: points(&report.daily_total, TOTAL)?,
        monthly: points(&report.monthly_total, TOTAL)?,
        seasons,
        weekdays: points(&report.weekday_total, TOTAL)?,
    })
}

/// Bike rental dashboard
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["csv", "table", "polar", "json"]),
        help = "output format, defaults to the config value"
    )]
    format: Option<String>,

    #[arg(long = "config", default_value = config::DEFAULT_FILE, help = "config file")]
    config: String,

    #[arg(long = "source", help = "rentals csv file, overrides the config")]
    source: Option<String>,

    /// since date
    #[arg(long = "since", value_parser = parse_date, help = "first day, e.g. 2011-01-01")]
    since: Option<NaiveDate>,

    /// until date
    #[arg(long = "until", value_parser = parse_date, help = "last day, e.g. 2012-12-31")]
    until: Option<NaiveDate>,

    #[arg(long = "out-dir", default_value = ".", help = "directory for csv output")]
    out_dir: PathBuf,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        error!("parse date err: {}", e);
        format!("invalid date {s:?}, expected YYYY-MM-DD")
    })
}

fn get_output(
    output_type: OutputType,
    dataset: Dataset,
    range: DateRange,
    out_dir: PathBuf,
) -> Result<Box<dyn Output>, Box<dyn Error>> {
    let output: Box<dyn Output> = match output_type {
        OutputType::Table => Box::new(TableOutput { dataset, range }),
        OutputType::Csv => Box::new(CsvOutput {
            dir: out_dir,
            report: dataset.report(&range)?,
        }),
        OutputType::Polar => Box::new(PolarOutput {
            report: dataset.report(&range)?,
        }),
        OutputType::Json => Box::new(JsonOutput {
            report: dataset.report(&range)?,
        }),
    };
    Ok(output)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let conf = Config::load(&args.config)?;
    debug!("config: {:?}", conf);

    let source = args.source.unwrap_or(conf.source);
    let format = args.format.unwrap_or(conf.output);
    let out_type = OutputType::from_str(&format)
        .ok_or_else(|| format!("unknown output format: {format}"))?;

    let dataset = Dataset::load(&source)?;
    let bounds = dataset
        .bounds()
        .ok_or_else(|| format!("no records in {source}"))?;
    let range = dataset.range(
        args.since.unwrap_or(bounds.start()),
        args.until.unwrap_or(bounds.end()),
    )?;
    info!("date range: {} .. {}", range.start(), range.end());

    get_output(out_type, dataset, range, args.out_dir)?.output()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
