use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use plan_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "weekplan")]
#[command(about = "Safety-adjusted weekly training plan generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the plan for a 7-day window (default)
    Plan {
        /// First day of the window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Training log CSV (overrides config)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Today's readiness, 1 (wrecked) to 5 (fresh)
        #[arg(long)]
        readiness: Option<u8>,

        /// Last night's sleep score
        #[arg(long, requires = "readiness")]
        sleep_score: Option<f64>,

        /// Show the unadjusted template plan
        #[arg(long)]
        draft: bool,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    plan_core::logging::init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);

    match cli.command {
        Some(Commands::Plan {
            start,
            history,
            readiness,
            sleep_score,
            draft,
            json,
        }) => {
            let config = Config::load_or_default(&config_path)?;
            let fatigue = readiness.map(|readiness| TodayFatigue {
                readiness,
                sleep_score,
            });
            cmd_plan(&config, start, history, fatigue, draft, json)
        }
        Some(Commands::Config { init }) => cmd_config(&config_path, init),
        None => {
            // Default to "plan" command
            let config = Config::load_or_default(&config_path)?;
            cmd_plan(&config, None, None, None, false, false)
        }
    }
}

fn cmd_plan(
    config: &Config,
    start: Option<NaiveDate>,
    history: Option<PathBuf>,
    fatigue: Option<TodayFatigue>,
    draft: bool,
    json: bool,
) -> Result<()> {
    let start_date = start.unwrap_or_else(|| chrono::Local::now().date_naive());
    let history_path = history.unwrap_or_else(|| config.data.history_csv.clone());

    tracing::debug!("Planning week of {} using log {:?}", start_date, history_path);

    let log = load_training_log(&history_path)?;
    let ctx = RulesContext::new(Last7dStats::from_log(&log, start_date), fatigue);

    let plan = if draft {
        validate_window(start_date)?;
        let plan = generate_draft_plan(&config.profile, start_date);
        add_optional_sunday_swim(&plan, &config.profile)
    } else {
        plan_week(&config.profile, start_date, &ctx)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        display_plan(&plan, &ctx);
    }

    Ok(())
}

fn cmd_config(path: &Path, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            return Err(Error::Config(format!(
                "Config already exists at {}",
                path.display()
            )));
        }
        Config::default().save_to(path)?;
        println!("✓ Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::load_or_default(path)?;
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

fn display_plan(plan: &WeekPlan, ctx: &RulesContext) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WEEK OF {}", plan.start_date);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for session in &plan.sessions {
        let mut line = format!(
            "  {} {}  {:<8} {:<28} {:>4} min  {}",
            session.date,
            session.date.weekday(),
            session.sport,
            session.title,
            session.duration_min,
            session.intensity,
        );
        if !session.tags.is_empty() {
            let tags: Vec<_> = session.tags.iter().map(|t| t.to_string()).collect();
            line.push_str(&format!("  [{}]", tags.join(", ")));
        }
        println!("{}", line);

        if let Some(ref notes) = session.notes {
            println!("      ↳ {}", notes);
        }
    }

    println!();
    println!(
        "  Planned: {} min (last 7 days: {} min)",
        plan.total_minutes(),
        ctx.last_7d_stats.total_minutes
    );

    if !plan.warnings.is_empty() {
        println!();
        for warning in &plan.warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if !plan.applied_rules.is_empty() {
        println!();
        println!("  Rules applied:");
        for rule in &plan.applied_rules {
            println!("  → {}", rule);
        }
    }

    println!();
}
