use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use weekgrid_core::cache::SnapshotCache;
use weekgrid_core::client::ScheduleClient;
use weekgrid_core::config::WeekgridConfig;
use weekgrid_core::grid::{GridLayout, WeekGrid};
use weekgrid_core::model::{validate_new_activity, Activity, NewActivity, SlotTime, Weekday};
use weekgrid_core::sync::{CachedSchedule, Loaded, Source};

#[derive(Parser)]
#[command(name = "weekgrid", about = "Weekgrid: weekly activity schedule", version)]
enum Cli {
    /// List all activities
    List {
        /// Output raw JSON instead of table
        #[arg(long)]
        json: bool,
    },
    /// Show the week as a day-by-time grid
    Grid,
    /// Add an activity. Omitted fields are taken from the last submitted form.
    Add {
        /// Activity name
        #[arg(short, long)]
        name: Option<String>,
        /// Day of week (понедельник..воскресенье, or monday..sunday / mon..sun)
        #[arg(short, long)]
        day: Option<String>,
        /// Start time, HH:MM
        #[arg(short, long)]
        time: Option<String>,
        /// Duration in minutes
        #[arg(short = 'm', long)]
        duration: Option<i64>,
    },
    /// Delete an activity
    Delete {
        /// Activity ID (full or unique prefix)
        id: String,
    },
    /// Export activities to JSON
    Export {
        /// Output file path
        #[arg(short, long, default_value = "weekgrid-export.json")]
        output: String,
    },
    /// Print the time slots of the grid
    Slots,
    /// Show server and snapshot status
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let config = load_config(std::env::current_dir().ok().as_deref());

    if let Err(err) = run(cli, &config).await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// Layered config, or defaults with a warning when it cannot be loaded.
fn load_config(project_dir: Option<&Path>) -> WeekgridConfig {
    WeekgridConfig::load(project_dir).unwrap_or_else(|e| {
        tracing::warn!("{e}; using defaults");
        WeekgridConfig::default_config()
    })
}

async fn run(cli: Cli, config: &WeekgridConfig) -> Result<()> {
    let schedule = make_schedule(config)?;
    match cli {
        Cli::List { json } => cmd_list(&schedule, json).await,
        Cli::Grid => cmd_grid(&schedule, config).await,
        Cli::Add {
            name,
            day,
            time,
            duration,
        } => cmd_add(&schedule, config, name, day, time, duration).await,
        Cli::Delete { id } => cmd_delete(&schedule, &id).await,
        Cli::Export { output } => cmd_export(&schedule, &output).await,
        Cli::Slots => cmd_slots(&schedule, config).await,
        Cli::Status => cmd_status(&schedule).await,
    }
}

fn make_schedule(config: &WeekgridConfig) -> Result<CachedSchedule> {
    let client = ScheduleClient::new(
        &config.client.server_url,
        Duration::from_secs(config.client.timeout_secs),
    )
    .context("failed to build HTTP client")?;
    let cache_path = config.client.resolve_cache_path()?;
    Ok(CachedSchedule::new(client, SnapshotCache::new(cache_path)))
}

fn warn_if_stale(loaded: &Loaded) {
    if let Source::Cache { reason } = &loaded.source {
        eprintln!(
            "{} server unreachable, showing cached snapshot ({})",
            "warning:".yellow().bold(),
            reason.dimmed()
        );
    }
}

/// Fetch the grid layout from the server, or build it from local config.
async fn layout(schedule: &CachedSchedule, config: &WeekgridConfig) -> GridLayout {
    match schedule.client().slots().await {
        Ok(layout) => layout,
        Err(e) => {
            tracing::debug!("using local grid: {e}");
            GridLayout::new(config.schedule.slots())
        }
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

async fn cmd_list(schedule: &CachedSchedule, json: bool) -> Result<()> {
    let loaded = schedule.load().await;
    warn_if_stale(&loaded);

    let mut activities = loaded.activities;
    activities.sort_by_key(|a| (a.day, a.time));

    if json {
        println!("{}", serde_json::to_string_pretty(&activities)?);
        return Ok(());
    }

    if activities.is_empty() {
        println!("{}", "No activities scheduled.".dimmed());
        return Ok(());
    }

    println!(
        "{:<10} {:<13} {:<6} {:>5}  {}",
        "ID".dimmed(),
        "Day".dimmed(),
        "Time".dimmed(),
        "Min".dimmed(),
        "Name".dimmed()
    );
    for a in &activities {
        println!(
            "{:<10} {:<13} {:<6} {:>5}  {}",
            short_id(&a.id).cyan(),
            a.day.label().magenta(),
            a.time.to_string(),
            a.duration,
            a.name
        );
    }
    println!("{}", format!("{} activities", activities.len()).dimmed());
    Ok(())
}

// ---------------------------------------------------------------------------
// grid
// ---------------------------------------------------------------------------

const CELL_WIDTH: usize = 12;

async fn cmd_grid(schedule: &CachedSchedule, config: &WeekgridConfig) -> Result<()> {
    let loaded = schedule.load().await;
    warn_if_stale(&loaded);
    let layout = layout(schedule, config).await;

    let grid = WeekGrid::build(&loaded.activities, &layout.times);

    let mut header = format!("{:<6}", "");
    for day in Weekday::ALL {
        header.push(' ');
        header.push_str(&pad(&capitalize(day.label()), CELL_WIDTH));
    }
    println!("{}", header.bold());

    for row in grid.rows() {
        let mut line = format!("{}", row.time.to_string().dimmed());
        for cell in &row.cells {
            line.push(' ');
            match cell {
                Some(a) => line.push_str(&pad(&a.name, CELL_WIDTH).green().to_string()),
                None => line.push_str(&pad("·", CELL_WIDTH).dimmed().to_string()),
            }
        }
        println!("{line}");
    }

    if !grid.unplaced().is_empty() {
        println!();
        println!("{}", "Off-grid activities:".yellow());
        for a in grid.unplaced() {
            println!("  {} {} {}", a.day.label(), a.time, a.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

async fn cmd_add(
    schedule: &CachedSchedule,
    config: &WeekgridConfig,
    name: Option<String>,
    day: Option<String>,
    time: Option<String>,
    duration: Option<i64>,
) -> Result<()> {
    let draft = schedule.snapshot().last_form;
    let (name, day, time, duration) = merge_with_draft(name, day, time, duration, draft.as_ref())?;

    let slots = config.schedule.slots();
    let rules = config.schedule.rules(&slots);
    let input = validate_new_activity(&name, &day, &time, duration, &rules)?;

    let created = match schedule.add(input).await {
        Ok(created) => created,
        Err(e) if e.is_unreachable() => {
            return Err(anyhow::Error::new(e)
                .context("server unreachable; the form was saved, rerun `weekgrid add` to retry"));
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "{} {} on {} at {} ({} min)  {}",
        "Added".green(),
        created.name.bold(),
        created.day.label(),
        created.time,
        created.duration,
        short_id(&created.id).dimmed()
    );
    Ok(())
}

/// Fill missing form fields from the last submitted draft.
fn merge_with_draft(
    name: Option<String>,
    day: Option<String>,
    time: Option<String>,
    duration: Option<i64>,
    draft: Option<&NewActivity>,
) -> Result<(String, String, String, i64)> {
    let name = name
        .or_else(|| draft.map(|d| d.name.clone()))
        .context("--name is required")?;
    let day = day
        .or_else(|| draft.map(|d| d.day.label().to_string()))
        .context("--day is required")?;
    let time = time
        .or_else(|| draft.map(|d| d.time.to_string()))
        .context("--time is required")?;
    let duration = duration
        .or_else(|| draft.map(|d| i64::from(d.duration)))
        .context("--duration is required")?;
    Ok((name, day, time, duration))
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

async fn cmd_delete(schedule: &CachedSchedule, id: &str) -> Result<()> {
    let loaded = schedule.load().await;
    let full_id = resolve_id(id, &loaded.activities)?;
    let name = loaded
        .activities
        .iter()
        .find(|a| a.id == full_id)
        .map(|a| a.name.clone());

    let message = schedule.remove(&full_id).await?;
    match name {
        Some(n) => println!("{} {} ({})", "Deleted".green(), n.bold(), message.dimmed()),
        None => println!("{} {}", "Deleted".green(), message.dimmed()),
    }
    Ok(())
}

/// Shortest prefix that is expanded to a full id.
const MIN_PREFIX_LEN: usize = 4;

/// Expand a short prefix to a full id when it matches exactly one activity.
/// Unknown ids and inputs shorter than [`MIN_PREFIX_LEN`] pass through
/// unchanged so the server can report them.
fn resolve_id(input: &str, activities: &[Activity]) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("activity id must not be empty");
    }
    if input.chars().count() < MIN_PREFIX_LEN || activities.iter().any(|a| a.id == input) {
        return Ok(input.to_string());
    }
    let matches: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Ok(input.to_string()),
        many => anyhow::bail!(
            "ambiguous id prefix '{input}' matches {} activities",
            many.len()
        ),
    }
}

// ---------------------------------------------------------------------------
// export / slots / status
// ---------------------------------------------------------------------------

async fn cmd_export(schedule: &CachedSchedule, output: &str) -> Result<()> {
    let loaded = schedule.load().await;
    warn_if_stale(&loaded);

    let json = serde_json::to_string_pretty(&loaded.activities)?;
    std::fs::write(output, json).with_context(|| format!("failed to write {output}"))?;
    println!(
        "Exported {} activities to {}",
        loaded.activities.len(),
        output.cyan()
    );
    Ok(())
}

async fn cmd_slots(schedule: &CachedSchedule, config: &WeekgridConfig) -> Result<()> {
    let layout = layout(schedule, config).await;
    let times: Vec<String> = layout.times.iter().map(SlotTime::to_string).collect();
    println!("{}", times.join(" "));
    Ok(())
}

async fn cmd_status(schedule: &CachedSchedule) -> Result<()> {
    println!("{}", "Weekgrid Status".bold());
    println!("  {} {}", "Server:".dimmed(), schedule.client().base_url().cyan());

    match schedule.client().health().await {
        Ok(health) => println!(
            "  {} {} (up {:.0}s)",
            "Health:".dimmed(),
            health.status.green(),
            health.uptime
        ),
        Err(e) => println!("  {} {}", "Health:".dimmed(), e.to_string().red()),
    }

    let snapshot = schedule.snapshot();
    println!(
        "  {} {} activities cached in {}",
        "Snapshot:".dimmed(),
        snapshot.activities.len(),
        schedule.cache().path().display()
    );
    if let Some(saved_at) = snapshot.saved_at {
        println!("  {} {}", "Saved at:".dimmed(), saved_at.to_rfc3339());
    }
    if let Some(draft) = snapshot.last_form {
        println!(
            "  {} {} {} {} ({} min)",
            "Last form:".dimmed(),
            draft.name,
            draft.day.label(),
            draft.time,
            draft.duration
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// formatting helpers
// ---------------------------------------------------------------------------

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate to `width` chars (marking cuts with `…`) and left-pad.
fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count > width {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        format!("{s:<width$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: "x".into(),
            day: Weekday::Monday,
            time: SlotTime::new(9, 0).unwrap(),
            duration: 30,
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0192f3a4-aaaa-bbbb"), "0192f3a4");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_capitalize_cyrillic() {
        assert_eq!(capitalize("понедельник"), "Понедельник");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_pad_and_truncate() {
        assert_eq!(pad("Yoga", 6), "Yoga  ");
        assert_eq!(pad("Йога", 6).chars().count(), 6);
        assert_eq!(pad("Stretching class", 8), "Stretch…");
    }

    #[test]
    fn test_resolve_id_exact_and_prefix() {
        let list = vec![activity("aaaa1111"), activity("bbbb2222")];
        assert_eq!(resolve_id("aaaa1111", &list).unwrap(), "aaaa1111");
        assert_eq!(resolve_id("bbbb", &list).unwrap(), "bbbb2222");
        assert_eq!(resolve_id("zzzz", &list).unwrap(), "zzzz");
    }

    #[test]
    fn test_resolve_id_rejects_empty_input() {
        let list = vec![activity("0192aaaa-real")];
        assert!(resolve_id("", &list).is_err());
        assert!(resolve_id("   ", &list).is_err());
    }

    #[test]
    fn test_resolve_id_short_input_not_expanded() {
        let list = vec![activity("0192aaaa-real")];
        assert_eq!(resolve_id("0", &list).unwrap(), "0");
        assert_eq!(resolve_id("019", &list).unwrap(), "019");
        assert_eq!(resolve_id("0192", &list).unwrap(), "0192aaaa-real");
    }

    #[test]
    fn test_load_config_falls_back_on_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".weekgrid");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(cfg_dir.join("config.toml"), "[client\nserver_url = ").unwrap();

        let config = load_config(Some(dir.path()));
        assert_eq!(config.client.server_url, "http://127.0.0.1:3000");
        assert_eq!(config.schedule.slot_minutes, 30);
    }

    #[test]
    fn test_resolve_id_ambiguous() {
        let list = vec![activity("abc1"), activity("abc2")];
        assert!(resolve_id("abc", &list).is_err());
    }

    #[test]
    fn test_merge_with_draft_fills_missing() {
        let draft = NewActivity::new("Yoga", Weekday::Monday, SlotTime::new(9, 0).unwrap(), 60);
        let (name, day, time, duration) =
            merge_with_draft(None, Some("вторник".into()), None, None, Some(&draft)).unwrap();
        assert_eq!(name, "Yoga");
        assert_eq!(day, "вторник");
        assert_eq!(time, "09:00");
        assert_eq!(duration, 60);
    }

    #[test]
    fn test_merge_without_draft_requires_fields() {
        let err = merge_with_draft(Some("A".into()), None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("--day"));
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "weekgrid", "add", "-n", "Yoga", "-d", "mon", "-t", "09:00", "-m", "60",
        ])
        .unwrap();
        assert!(matches!(
            cli,
            Cli::Add {
                duration: Some(60),
                ..
            }
        ));
    }
}
