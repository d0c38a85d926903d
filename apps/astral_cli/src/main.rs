use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

use astral::{AstralService, BirthMoment, HoroscopePeriod, ScanWindow};

#[derive(Parser, Debug)]
#[command(author, version, about = "Natal charts, aspects and transits")]
struct Args {
    /// Path to astral.toml (defaults to configs/astral.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Positions, houses and signs at birth
    Natal {
        /// Local civil time of birth, YYYY-MM-DDTHH:MM
        #[arg(long)]
        date: String,
        #[arg(long)]
        place: String,
        /// Include aspects of the personal bodies
        #[arg(long)]
        aspects: bool,
    },
    /// Classify the angle between two longitudes
    Aspect {
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
        #[arg(long, default_value_t = 8.0)]
        orb: f64,
    },
    /// Transits to the natal chart over the current month or year
    Transits {
        #[arg(long)]
        date: String,
        #[arg(long)]
        place: String,
        #[arg(long, value_enum, default_value_t = WindowArg::Month)]
        window: WindowArg,
        /// Day the window is taken around (defaults to today)
        #[arg(long)]
        on: Option<NaiveDate>,
        /// Merge hits on consecutive days
        #[arg(long)]
        coalesce: bool,
    },
    /// Moon sign and lunar day
    Lunar {
        /// RFC 3339 instant (defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Date range of a horoscope period
    Period {
        /// today | week | month | year
        name: HoroscopePeriod,
        #[arg(long)]
        on: Option<NaiveDate>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WindowArg {
    Month,
    Year,
}

fn parse_birth(date: &str) -> Result<BirthMoment> {
    let naive = NaiveDateTime::parse_from_str(date.trim(), "%Y-%m-%dT%H:%M")
        .with_context(|| format!("expected YYYY-MM-DDTHH:MM, got '{}'", date))?;
    Ok(BirthMoment::from_naive(naive))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = astral_config::load_config(args.config.as_deref())?;
    let service = AstralService::from_config(&config).context("failed to set up astral service")?;
    let today = service.converter().to_local(Utc::now()).date();

    match args.command {
        Command::Natal {
            date,
            place,
            aspects,
        } => {
            let moment = parse_birth(&date)?;
            if aspects {
                print_json(&service.natal_report(&moment, &place).await?)?;
            } else {
                print_json(&service.compute_natal_positions(&moment, &place).await?)?;
            }
        }
        Command::Aspect { lon1, lon2, orb } => {
            let kind = service.classify_aspect(lon1, lon2, orb);
            print_json(&json!({
                "lon1": lon1,
                "lon2": lon2,
                "orb": orb,
                "aspect": kind,
            }))?;
        }
        Command::Transits {
            date,
            place,
            window,
            on,
            coalesce,
        } => {
            let moment = parse_birth(&date)?;
            let natal = service.compute_natal_positions(&moment, &place).await?;
            let anchor = on.unwrap_or(today);
            let window = match window {
                WindowArg::Month => ScanWindow::current_month(anchor),
                WindowArg::Year => ScanWindow::current_year(anchor),
            };
            let mut report = service
                .scan_transits(&natal.longitudes, &place, window)
                .await?;
            if coalesce {
                report = report.coalesce();
            }
            if report.degraded {
                log::warn!(
                    "{} of {} days could not be computed",
                    report.days_failed,
                    report.days_scanned
                );
            }
            print_json(&report)?;
        }
        Command::Lunar { at } => {
            let instant = at.unwrap_or_else(Utc::now);
            print_json(&service.lunar_snapshot(instant)?)?;
        }
        Command::Period { name, on } => {
            let anchor = on.unwrap_or(today);
            print_json(&json!({
                "period": name,
                "start": name.start_date(anchor),
                "end": name.end_date(anchor),
                "transit_window": name.transit_window(anchor),
            }))?;
        }
    }

    Ok(())
}
