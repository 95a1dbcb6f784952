//! Interactive workout in the terminal.
//!
//! Drives a [`Walkthrough`] from stdin: Enter finishes a rep set or skips a
//! timer, `q` ends the workout early without logging it.

use std::io::Write;
use std::time::Duration;

use jiff::Timestamp;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time;

use crate::model::{Day, Rpe, SessionLog, Target};
use crate::workout::{COUNTDOWN_SECS, NextUp, Phase, Walkthrough};

type Input = Lines<BufReader<Stdin>>;

/// How a wait ended.
enum Control {
    Continue,
    Quit,
}

/// Runs the whole workout. `None` means the user ended it early.
pub(super) async fn run(day: &Day) -> Result<Option<SessionLog>, String> {
    let mut walkthrough =
        Walkthrough::new(day).ok_or_else(|| format!("{} has no exercises", day.name))?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", day.name);
    println!("Enter: done / skip timer    q: end workout");
    println!();

    loop {
        let control = match walkthrough.phase() {
            Phase::Countdown => timer(&mut input, "Starting in", COUNTDOWN_SECS).await?,
            Phase::Exercise => exercise(&mut input, &walkthrough).await?,
            Phase::Rest => {
                let label = format!(
                    "REST (next: {} set {})",
                    walkthrough.exercise().name,
                    walkthrough.set()
                );
                timer(&mut input, &label, walkthrough.rest_secs()).await?
            }
            Phase::Finished => break,
        };
        if matches!(control, Control::Quit) {
            println!("Workout ended early; nothing logged.");
            return Ok(None);
        }
        walkthrough.advance();
    }

    println!("Session complete!");
    let rpe = prompt_rpe(&mut input).await?;
    Ok(walkthrough.finish(rpe, Timestamp::now()))
}

async fn exercise(input: &mut Input, walkthrough: &Walkthrough<'_>) -> Result<Control, String> {
    let exercise = walkthrough.exercise();
    println!(
        "Set {} of {}: {}",
        walkthrough.set(),
        exercise.sets,
        exercise.name
    );
    print_next_up(walkthrough);

    match exercise.target {
        Target::Timed { seconds } => timer(input, "Hold", seconds).await,
        Target::Reps { count: 0 } => wait_enter(input, "As many reps as possible, Enter when done").await,
        Target::Reps { count } => wait_enter(input, &format!("{count} reps, Enter when done")).await,
    }
}

fn print_next_up(walkthrough: &Walkthrough<'_>) {
    match walkthrough.next_up() {
        NextUp::Set { number, exercise } => println!("  next up: set {number} of {exercise}"),
        NextUp::Exercise(name) => println!("  next up: {name}"),
        NextUp::FinalExercise => println!("  final exercise!"),
    }
}

async fn wait_enter(input: &mut Input, prompt: &str) -> Result<Control, String> {
    print!("  {prompt} > ");
    flush();
    read_control(input).await
}

/// Counts down `secs` seconds. Enter skips ahead.
async fn timer(input: &mut Input, label: &str, secs: u32) -> Result<Control, String> {
    let mut ticker = time::interval(Duration::from_secs(1));
    let mut left = secs;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if left == 0 {
                    println!("\r  {label}: done   ");
                    return Ok(Control::Continue);
                }
                print!("\r  {label}: {left:>3}s ");
                flush();
                left -= 1;
            }
            control = read_control(input) => {
                println!();
                return control;
            }
        }
    }
}

async fn read_control(input: &mut Input) -> Result<Control, String> {
    let line = input
        .next_line()
        .await
        .map_err(|e| format!("failed to read input: {e}"))?;
    match line {
        None => Ok(Control::Quit),
        Some(l) if l.trim().eq_ignore_ascii_case("q") => Ok(Control::Quit),
        Some(_) => Ok(Control::Continue),
    }
}

async fn prompt_rpe(input: &mut Input) -> Result<Rpe, String> {
    loop {
        print!("Rate the effort, 1 (easy) to 10 (max), Enter to skip > ");
        flush();
        let Some(line) = input
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        else {
            return Ok(Rpe::Unrated);
        };
        match parse_rpe_answer(&line) {
            Ok(rpe) => return Ok(rpe),
            Err(e) => println!("{e}"),
        }
    }
}

fn parse_rpe_answer(line: &str) -> Result<Rpe, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Rpe::Unrated);
    }
    super::parse_rpe(line)
}

fn flush() {
    let _ = std::io::stdout().flush();
}
