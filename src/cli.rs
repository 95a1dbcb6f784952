//! CLI interface for the coach.
//!
//! Every command except `workout` and `watch` is one-shot: arguments in,
//! summary out. Progress and warnings go to stderr, results to stdout.
//!
//! Logging a session may trigger a plan adjustment. When offline it is queued
//! and retried by `coach watch` the next time the connection comes back.

mod format;
mod workout;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;

use crate::config::Config;
use crate::connectivity::{Connectivity, ConnectivityProbe};
use crate::coordinator::{Coordinator, Logged};
use crate::model::{
    BaselineAssessment, FitnessGoal, FitnessProfile, OnboardingData, Rpe, SessionLog, UserProfile,
};
use crate::planner::GeminiPlanner;
use crate::performance;
use crate::storage::Storage;

use format::{describe_outcome, format_summary, format_week};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const NOT_ONBOARDED: &str = "no workout plan yet: run `coach onboard` first";

/// Coach: a calisthenics plan that adapts to how hard your sessions feel.
#[derive(Debug, Parser)]
#[command(name = "coach", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Treat the network as unavailable for this run.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. coach onboard --weight 75 --height 178 --goal lean --max-pushups 12 --max-plank 40
  2. coach plan
  3. coach workout week1-day1      (or: coach log week1-day1 --rpe 7)
  4. coach history

After every fourth session, if the last two were both easy (RPE 6 or less;
an unrated session counts as hard), the plan is regenerated for the next
phase. Offline, the adjustment waits:
  coach watch";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer the onboarding questions and generate the first plan.
    Onboard(OnboardArgs),

    /// Show the plan. Defaults to the current week.
    Plan {
        /// Week number to show.
        #[arg(long)]
        week: Option<u32>,
    },

    /// Do a workout interactively, then log it.
    Workout {
        /// Plan day to perform (e.g. `week1-day1`).
        day: String,
    },

    /// Log a session for a plan day without the walkthrough.
    Log {
        /// Plan day performed (e.g. `week1-day1`).
        day: String,

        /// Rate of perceived exertion, 1 (easy) to 10 (max effort).
        #[arg(long, value_parser = parse_rpe)]
        rpe: Option<Rpe>,
    },

    /// List logged sessions with volume and RPE.
    History,

    /// Show onboarding, connectivity and adjustment state.
    Status,

    /// Stay running and retry a pending adjustment whenever the connection returns.
    Watch,

    /// Erase profile, plan, history and any pending adjustment.
    Reset,
}

impl Command {
    fn needs_network(&self) -> bool {
        matches!(
            self,
            Self::Onboard(_) | Self::Workout { .. } | Self::Log { .. } | Self::Status | Self::Watch
        )
    }
}

#[derive(Debug, clap::Args)]
pub struct OnboardArgs {
    /// Body weight in kilograms.
    #[arg(long)]
    weight: f64,

    /// Height in centimetres.
    #[arg(long)]
    height: f64,

    #[arg(long, value_enum)]
    goal: GoalArg,

    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=7))]
    sessions_per_week: u32,

    /// Most push-ups you can do in one set.
    #[arg(long)]
    max_pushups: u32,

    /// Longest plank hold, in seconds.
    #[arg(long)]
    max_plank: u32,

    /// You can't yet do a full push-up from the toes.
    #[arg(long)]
    no_standard_pushup: bool,

    /// No pull-up bar or other equipment available.
    #[arg(long)]
    no_equipment: bool,
}

impl OnboardArgs {
    fn to_domain(&self) -> OnboardingData {
        OnboardingData {
            user_profile: UserProfile {
                weight_kg: self.weight,
                height_cm: self.height,
            },
            fitness_profile: FitnessProfile {
                primary_goal: self.goal.to_domain(),
                sessions_per_week: self.sessions_per_week,
            },
            baseline: BaselineAssessment {
                max_pushups: self.max_pushups,
                max_plank_seconds: self.max_plank,
                can_perform_standard_pushup: !self.no_standard_pushup,
                has_equipment: !self.no_equipment,
            },
        }
    }
}

/// CLI-facing goal, mapped to the domain `FitnessGoal`.
#[derive(Debug, Clone, ValueEnum)]
pub enum GoalArg {
    /// Low reps, long rests.
    Strength,
    /// Hypertrophy: moderate reps and rests.
    Lean,
    /// Timed sets and AMRAP, short rests.
    Endurance,
}

impl GoalArg {
    fn to_domain(&self) -> FitnessGoal {
        match self {
            Self::Strength => FitnessGoal::Strength,
            Self::Lean => FitnessGoal::Lean,
            Self::Endurance => FitnessGoal::Endurance,
        }
    }
}

fn parse_rpe(s: &str) -> Result<Rpe, String> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("RPE must be a whole number from 1 to 10, got {s:?}"))?;
    Rpe::rated(value).map_err(|e| e.to_string())
}

type CoachCoordinator = Coordinator<GeminiPlanner>;

/// Run the CLI, returning an error message on failure.
pub async fn run(config: &Config, storage: Storage) -> Result<(), String> {
    let cli = Cli::parse();

    let online = if cli.offline || !cli.command.needs_network() {
        false
    } else {
        probe(config)?.check().await
    };
    let planner = GeminiPlanner::new(
        config.api_key.clone().unwrap_or_default(),
        config.request_timeout(),
    )
    .map_err(|e| format!("failed to set up the planner: {e}"))?
    .with_model(config.model.as_str())
    .with_base_url(config.api_base_url.as_str());
    let coordinator = Coordinator::load(storage, planner, online)
        .map_err(|e| format!("failed to load coach data: {e}"))?;

    match cli.command {
        Command::Onboard(args) => cmd_onboard(config, &coordinator, &args).await,
        Command::Plan { week } => cmd_plan(&coordinator, week),
        Command::Workout { day } => cmd_workout(&coordinator, &day).await,
        Command::Log { day, rpe } => cmd_log(&coordinator, &day, rpe.unwrap_or_default()).await,
        Command::History => cmd_history(&coordinator),
        Command::Status => cmd_status(&coordinator),
        Command::Watch => {
            if cli.offline {
                return Err("watch needs the network; drop --offline".to_string());
            }
            cmd_watch(config, coordinator).await
        }
        Command::Reset => cmd_reset(&coordinator),
    }
}

fn probe(config: &Config) -> Result<ConnectivityProbe, String> {
    ConnectivityProbe::for_url(&config.api_base_url, PROBE_TIMEOUT)
        .ok_or_else(|| format!("api-base-url is not a usable URL: {}", config.api_base_url))
}

async fn cmd_onboard(
    config: &Config,
    coordinator: &CoachCoordinator,
    args: &OnboardArgs,
) -> Result<(), String> {
    if coordinator.is_onboarded() {
        return Err("already onboarded; run `coach reset` to start over".to_string());
    }
    config.require_api_key()?;
    if !coordinator.is_online() {
        return Err("offline: generating a plan needs a connection".to_string());
    }

    eprintln!("Generating your plan...");
    coordinator
        .generate_initial_plan(&args.to_domain())
        .await
        .map_err(|e| e.to_string())?;

    let plan = coordinator.plan().ok_or(NOT_ONBOARDED)?;
    eprintln!("Plan {} ready: {} weeks", plan.id, plan.weeks.len());
    if let Some(week) = plan.weeks.first() {
        println!("{}", format_week(week));
    }
    Ok(())
}

fn cmd_plan(coordinator: &CoachCoordinator, week: Option<u32>) -> Result<(), String> {
    let plan = coordinator.plan().ok_or(NOT_ONBOARDED)?;
    let week = match week {
        Some(n) => plan
            .weeks
            .iter()
            .find(|w| w.week == n)
            .ok_or_else(|| format!("the plan has no week {n}"))?,
        None => plan
            .weeks
            .get(plan.current_week_index())
            .ok_or("the plan has no weeks")?,
    };
    println!("{}", format_week(week));
    Ok(())
}

async fn cmd_workout(coordinator: &CoachCoordinator, day_id: &str) -> Result<(), String> {
    let plan = coordinator.plan().ok_or(NOT_ONBOARDED)?;
    let day = plan
        .find_day(day_id)
        .ok_or_else(|| format!("no day {day_id} in the plan"))?;
    if day.is_completed {
        eprintln!("{} is already done; logging it again.", day.name);
    }

    let Some(log) = workout::run(day).await? else {
        return Ok(());
    };
    record(coordinator, log).await
}

async fn cmd_log(coordinator: &CoachCoordinator, day_id: &str, rpe: Rpe) -> Result<(), String> {
    let plan = coordinator.plan().ok_or(NOT_ONBOARDED)?;
    let day = plan
        .find_day(day_id)
        .ok_or_else(|| format!("no day {day_id} in the plan"))?;
    let log = SessionLog::from_day(day, rpe, Timestamp::now());
    record(coordinator, log).await
}

async fn record(coordinator: &CoachCoordinator, log: SessionLog) -> Result<(), String> {
    let name = log.name.clone();
    let rpe = log.rpe;
    eprintln!("Logging {name} ({rpe})...");
    let Logged { miss, adjustment } = coordinator
        .log_session(log)
        .await
        .map_err(|e| format!("failed to log session: {e}"))?;

    if let Some(miss) = miss {
        eprintln!("Warning: {miss}");
    }
    if let Some(outcome) = adjustment {
        eprintln!("{}", describe_outcome(&outcome));
    }
    println!("Logged {name} ({rpe})");
    Ok(())
}

fn cmd_history(coordinator: &CoachCoordinator) -> Result<(), String> {
    let history = coordinator.history();
    if history.is_empty() {
        println!("No sessions logged");
        return Ok(());
    }
    println!("{}", format_summary(&performance::summarize(&history)));
    Ok(())
}

fn cmd_status(coordinator: &CoachCoordinator) -> Result<(), String> {
    match coordinator.plan() {
        Some(plan) if coordinator.is_onboarded() => {
            let week = plan
                .weeks
                .get(plan.current_week_index())
                .map_or(0, |w| w.week);
            println!("Plan:        {} (week {week})", plan.id);
        }
        _ => println!("Plan:        none (run `coach onboard`)"),
    }
    if let Some(profile) = coordinator.profile() {
        println!(
            "Profile:     {} kg, {} cm",
            profile.weight_kg, profile.height_cm
        );
    }
    println!("Sessions:    {}", coordinator.history().len());
    println!(
        "Connection:  {}",
        if coordinator.is_online() { "online" } else { "offline" }
    );
    println!(
        "Adjustment:  {}",
        if coordinator.adjustment_pending() { "pending" } else { "none" }
    );
    if let Some(e) = coordinator.last_error() {
        println!("Last error:  {e}");
    }
    Ok(())
}

async fn cmd_watch(config: &Config, coordinator: CoachCoordinator) -> Result<(), String> {
    let probe = probe(config)?;
    let coordinator = Arc::new(coordinator);
    let connectivity = Connectivity::new(coordinator.is_online());

    eprintln!(
        "Watching connectivity every {}s (Ctrl-C to stop)",
        config.probe_interval().as_secs()
    );
    if coordinator.adjustment_pending() {
        eprintln!("An adjustment is pending; it runs on the next reconnect.");
    }

    let prober = tokio::spawn(probe.run(connectivity.clone(), config.probe_interval()));
    let watcher = Arc::clone(&coordinator).watch_connectivity(connectivity.subscribe());
    tokio::select! {
        () = watcher => {}
        res = tokio::signal::ctrl_c() => {
            res.map_err(|e| format!("failed to listen for Ctrl-C: {e}"))?;
        }
    }
    prober.abort();

    if coordinator.is_busy() {
        eprintln!("Stopped during a plan request; the adjustment is still pending.");
    } else if coordinator.adjustment_pending() {
        eprintln!("Stopped; the adjustment is still pending.");
    } else {
        eprintln!("Stopped.");
    }
    Ok(())
}

fn cmd_reset(coordinator: &CoachCoordinator) -> Result<(), String> {
    coordinator
        .reset()
        .map_err(|e| format!("failed to reset: {e}"))?;
    eprintln!("All coach data erased");
    Ok(())
}
