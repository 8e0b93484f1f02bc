use basal_core::config::{CycleConfig, MAX_FUTURE_WINDOWS};
use basal_core::cycles::current_period_start;
use basal_core::fertility::calendar_marks;
use basal_core::stats::{cycle_stats, temperature_stats, tracking_streak};
use basal_core::*;
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "basal")]
#[command(about = "Basal temperature ovulation tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Only analyse entries from the last N days
    #[arg(long, global = true)]
    days: Option<u32>,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the temperature (and optionally bleeding) for a day
    Log {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        /// Waking temperature in °C
        temperature: f64,

        /// Flow intensity (spotting, light, medium, heavy)
        #[arg(long)]
        flow: Option<String>,

        /// Cervical mucus (dry, sticky, creamy, watery, eggwhite)
        #[arg(long)]
        mucus: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete everything recorded for a day
    Remove {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Show the current cycle overview (default)
    Status,

    /// Detect ovulation in the current cycle's readings
    Detect,

    /// One ovulation per cycle, detected or predicted
    Ovulations,

    /// Cycle starts and statistics
    Cycles,

    /// Fertility windows for the current and upcoming cycles
    Window {
        /// Cycle start to project from, defaults to the current period start
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Number of cycles to project
        #[arg(long)]
        cycles: Option<usize>,
    },

    /// Per-day series for charting
    Chart,

    /// Readings of each cycle on a shared cycle-day axis
    Compare,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        basal_core::logging::init();
    } else {
        basal_core::logging::init_with_level("warn");
    }

    if let Some(Commands::Config { init: true }) = cli.command {
        return cmd_config_init(cli.config.as_deref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = EntryStore::new(data_dir);
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let since = match cli.days {
        Some(days) => Some(today.checked_sub_days(Days::new(u64::from(days))).ok_or_else(|| {
            Error::InvalidEntry(format!("--days {} reaches before the earliest supported date", days))
        })?),
        None => None,
    };

    let ctx = Context {
        store,
        config,
        today,
        since,
        json: cli.json,
    };

    match cli.command {
        Some(Commands::Log {
            date,
            temperature,
            flow,
            mucus,
            notes,
        }) => cmd_log(&ctx, date, temperature, flow, mucus, notes),
        Some(Commands::Remove { date }) => cmd_remove(&ctx, date),
        Some(Commands::Detect) => cmd_detect(&ctx),
        Some(Commands::Ovulations) => cmd_ovulations(&ctx),
        Some(Commands::Cycles) => cmd_cycles(&ctx),
        Some(Commands::Window { start, cycles }) => cmd_window(&ctx, start, cycles),
        Some(Commands::Chart) => cmd_chart(&ctx),
        Some(Commands::Compare) => cmd_compare(&ctx),
        Some(Commands::Config { .. }) => cmd_config_show(&ctx),
        Some(Commands::Status) | None => cmd_status(&ctx),
    }
}

struct Context {
    store: EntryStore,
    config: Config,
    today: NaiveDate,
    since: Option<NaiveDate>,
    json: bool,
}

impl Context {
    fn load(&self) -> Result<(Vec<TemperatureReading>, Vec<FlowEntry>)> {
        let readings = self.store.load_temperatures(self.since)?;
        let flows = self.store.load_flow_entries(self.since)?;
        Ok((readings, flows))
    }

    fn cycle(&self) -> &CycleConfig {
        &self.config.cycle
    }

    fn temp(&self, value: f64) -> String {
        format_temperature(value, self.config.display.temperature_unit)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_flow(value: &str) -> Result<FlowIntensity> {
    match value.to_lowercase().as_str() {
        "spotting" => Ok(FlowIntensity::Spotting),
        "light" => Ok(FlowIntensity::Light),
        "medium" => Ok(FlowIntensity::Medium),
        "heavy" => Ok(FlowIntensity::Heavy),
        other => Err(Error::InvalidEntry(format!("unknown flow intensity: {}", other))),
    }
}

fn parse_mucus(value: &str) -> Result<CervicalMucus> {
    match value.to_lowercase().as_str() {
        "dry" => Ok(CervicalMucus::Dry),
        "sticky" => Ok(CervicalMucus::Sticky),
        "creamy" => Ok(CervicalMucus::Creamy),
        "watery" => Ok(CervicalMucus::Watery),
        "eggwhite" | "egg_white" => Ok(CervicalMucus::Eggwhite),
        other => Err(Error::InvalidEntry(format!("unknown cervical mucus: {}", other))),
    }
}

fn cmd_log(
    ctx: &Context,
    date: NaiveDate,
    temperature: f64,
    flow: Option<String>,
    mucus: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let entry = DayEntry {
        reading: TemperatureReading {
            date,
            temperature,
            notes,
            cervical_mucus: mucus.as_deref().map(parse_mucus).transpose()?,
        },
        flow: flow.as_deref().map(parse_flow).transpose()?,
    };

    ctx.store.upsert_day(&entry)?;

    println!("✓ Recorded {} for {}", ctx.temp(temperature), date);
    if let Some(flow) = entry.flow {
        println!("  Flow: {:?}", flow);
    }
    Ok(())
}

fn cmd_remove(ctx: &Context, date: NaiveDate) -> Result<()> {
    if ctx.store.delete_day(date)? {
        println!("✓ Removed entries for {}", date);
    } else {
        println!("Nothing recorded for {}", date);
    }
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let overview = cycle_overview(&readings, &flows, ctx.today, ctx.cycle());

    if ctx.json {
        return print_json(&overview);
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CYCLE OVERVIEW  {}", overview.today);
    println!("╰─────────────────────────────────────────╯");
    println!();

    match (overview.last_period_start, overview.cycle_day) {
        (Some(start), Some(day)) => {
            println!("  Cycle day {} of ~{} (started {})", day, ctx.cycle().default_length, start)
        }
        _ => println!("  Cycle day: no period recorded"),
    }
    if let Some(phase) = overview.phase {
        println!("  Phase: {:?}", phase);
    }
    if let Some(reading) = &overview.last_reading {
        println!("  Last temperature: {} on {}", ctx.temp(reading.temperature), reading.date);
    }

    match (overview.ovulation.ovulation_date, overview.ovulation.cover_line_temp) {
        (Some(date), Some(cover)) => {
            println!("  Ovulation: detected ✓ {} (cover line {})", date, ctx.temp(cover))
        }
        _ => match (overview.next_ovulation, overview.days_until_ovulation) {
            (Some(date), Some(days)) if days > 0 => {
                println!("  Ovulation: expected in ~{}d ({})", days, date)
            }
            _ => println!("  Ovulation: not enough data"),
        },
    }

    match (overview.next_period, overview.days_until_period) {
        (Some(date), Some(days)) if days > 0 => {
            println!("  Next period: in ~{}d ({})", days, date)
        }
        _ => println!("  Next period: not enough data"),
    }

    println!("  Fertility today: {:?}", overview.fertility_status);
    println!();
    Ok(())
}

fn cmd_detect(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let flow_dates: Vec<NaiveDate> = flows.iter().map(|f| f.date).collect();

    let current: Vec<TemperatureReading> = match current_period_start(&flow_dates) {
        Some(start) => readings.into_iter().filter(|r| r.date >= start).collect(),
        None => readings,
    };
    let result = detect_ovulation(&current);

    if ctx.json {
        return print_json(&result);
    }

    match (result.ovulation_date, result.cover_line_temp) {
        (Some(date), Some(cover)) => {
            println!("Ovulation detected: {}", date);
            println!("  Cover line: {}", ctx.temp(cover));
            if let Some(day) = result.cycle_day {
                println!("  Cycle day: {}", day);
            }
        }
        _ => println!(
            "No ovulation detected ({:?}, {} readings)",
            result.phase,
            current.len()
        ),
    }
    Ok(())
}

fn cmd_ovulations(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let results = analyze_history(&readings, &flows, ctx.cycle().default_length);

    if ctx.json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No ovulations found.");
        return Ok(());
    }

    for result in &results {
        let Some(date) = result.ovulation_date else {
            continue;
        };
        match result.cover_line_temp {
            Some(cover) => println!("  {}  detected   cover line {}", date, ctx.temp(cover)),
            None => println!("  {}  predicted", date),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CyclesReport {
    cycles: stats::CycleStats,
    temperatures: stats::TemperatureStats,
    streak_days: u32,
}

fn cmd_cycles(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let flow_dates: Vec<NaiveDate> = flows.iter().map(|f| f.date).collect();
    let reading_dates: Vec<NaiveDate> = readings.iter().map(|r| r.date).collect();

    let report = CyclesReport {
        cycles: cycle_stats(&flow_dates),
        temperatures: temperature_stats(&readings),
        streak_days: tracking_streak(&reading_dates, ctx.today),
    };

    if ctx.json {
        return print_json(&report);
    }

    println!("Cycle starts: {}", report.cycles.cycle_starts.len());
    for span in &report.cycles.cycles {
        println!("  {} → {}  {}d", span.start, span.next_start, span.length);
    }
    if let (Some(avg), Some(min), Some(max)) = (
        report.cycles.avg_cycle_length,
        report.cycles.shortest_cycle,
        report.cycles.longest_cycle,
    ) {
        println!("Average cycle: {} days ({}–{})", avg, min, max);
    }
    if let Some(period) = report.cycles.avg_period_length {
        println!("Average period: {} days", period);
    }
    if let Some(mean) = report.temperatures.mean {
        println!("Average temperature: {}", ctx.temp(mean));
    }
    println!("Tracking streak: {} days", report.streak_days);
    Ok(())
}

#[derive(Serialize)]
struct WindowReport {
    start: NaiveDate,
    windows: Vec<FertilityWindow>,
    calendar: fertility::CalendarMarks,
}

fn cmd_window(ctx: &Context, start: Option<NaiveDate>, cycles: Option<usize>) -> Result<()> {
    let start = match start {
        Some(start) => Some(start),
        None => {
            let flows = ctx.store.load_flow_entries(ctx.since)?;
            let dates: Vec<NaiveDate> = flows.iter().map(|f| f.date).collect();
            current_period_start(&dates)
        }
    };

    let Some(start) = start else {
        println!("No period recorded; pass --start to project windows.");
        return Ok(());
    };

    let cycle = ctx.cycle();
    let count = cycles.unwrap_or(cycle.future_windows);
    if count > MAX_FUTURE_WINDOWS {
        return Err(Error::InvalidEntry(format!(
            "--cycles {} exceeds the maximum of {}",
            count, MAX_FUTURE_WINDOWS
        )));
    }
    let windows = future_windows(start, cycle.default_length, cycle.luteal_phase, count);

    if ctx.json {
        return print_json(&WindowReport {
            start,
            calendar: calendar_marks(&windows),
            windows,
        });
    }

    for window in &windows {
        println!(
            "  fertile {} – {}   peak {} – {}",
            window.start, window.end, window.peak_start, window.peak_end
        );
    }
    println!(
        "Today ({}): {:?}",
        ctx.today,
        fertility_status_multi(ctx.today, &windows)
    );
    Ok(())
}

fn cmd_chart(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let points = chart::chart_series(&readings, &flows, ctx.cycle().default_length);

    if ctx.json {
        return print_json(&points);
    }

    for point in &points {
        let mut marks = String::new();
        if point.is_period {
            marks.push_str(" period");
        }
        if point.is_ovulation {
            marks.push_str(" ovulation");
        }
        println!("  {}  {}{}", point.date, ctx.temp(point.temperature), marks);
    }
    Ok(())
}

fn cmd_compare(ctx: &Context) -> Result<()> {
    let (readings, flows) = ctx.load()?;
    let cycles = chart::cycle_series(&readings, &flows);

    if ctx.json {
        return print_json(&cycles);
    }

    if cycles.is_empty() {
        println!("No cycles with at least {} readings.", chart::MIN_CYCLE_POINTS);
        return Ok(());
    }

    println!("{} cycles to compare", cycles.len());
    for cycle in &cycles {
        let last_day = cycle.points.last().map_or(0, |p| p.cycle_day);
        println!(
            "  Cycle {}  from {}  {} readings, through day {}",
            cycle.cycle_number,
            cycle.start,
            cycle.points.len(),
            last_day
        );
    }
    Ok(())
}

fn cmd_config_show(ctx: &Context) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.config);
    }

    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let target = path.map_or_else(Config::default_config_path, |p| p.to_path_buf());
    if target.exists() {
        return Err(Error::Config(format!(
            "{} already exists; edit it instead",
            target.display()
        )));
    }

    let config = Config::default();
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("✓ Wrote default configuration to {}", target.display());
    Ok(())
}
