use activity_log::client::{
    history::{load_history, persist_history},
    leaderboard::build_leaderboard,
    ClientConfig, FormState, LogPayload, LogServiceClient, ResolvedClientConfig, Submitter,
    SystemLauncher,
};
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "activity-submit", version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Client configuration file (defaults to $ACTIVITY_CLIENT_CONFIG)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log an activity and open the pre-filled external form
    Submit {
        /// Member name or roster index
        #[arg(long)]
        member: String,
        #[arg(long)]
        activity: String,
        /// Minutes spent
        #[arg(long)]
        duration: String,
        /// Print the form link instead of opening it
        #[arg(long = "no-open")]
        no_open: bool,
    },
    /// Show the most recent entries stored by the log service
    List,
    /// Show submissions made from this machine and the leaderboard
    History,
    /// Show the configured roster
    Members,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = ClientConfig::load_or_default(args.config.as_deref(), "ACTIVITY_CLIENT_CONFIG")
        .context("failed to load client configuration")?
        .resolve()
        .context("invalid client configuration")?;

    match args.command {
        Command::Submit {
            member,
            activity,
            duration,
            no_open,
        } => submit(Arc::new(config), &member, &activity, &duration, no_open).await,
        Command::List => list(&config).await,
        Command::History => history(&config).await,
        Command::Members => {
            for (index, member) in config.members.iter().enumerate() {
                println!("{index:>3}  {:<32} {}", member.name, member.cwid);
            }
            Ok(())
        }
    }
}

async fn submit(
    config: Arc<ResolvedClientConfig>,
    member: &str,
    activity: &str,
    duration: &str,
    no_open: bool,
) -> Result<()> {
    let mut form = FormState::new();
    form.select_member(config.find_member(member));
    form.set_activity(activity);
    form.type_manual(duration);

    let submission = form
        .validate(&config)
        .context("submission is incomplete")?;

    let sink = LogServiceClient::new(&config.log_service)?;
    let submitter = Submitter::new(sink, Arc::clone(&config));
    let outcome = if no_open {
        submitter.submit(&submission).await
    } else {
        submitter.submit_and_open(&submission, &SystemLauncher).await
    };

    if let Some(settings) = &config.history {
        let payload = LogPayload::new(&config.team, &submission);
        let mut recent = load_history(&settings.path).await;
        recent.record(
            &payload,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            outcome.logged.is_some(),
            settings.limit,
        );
        if let Err(err) = persist_history(&settings.path, &recent).await {
            warn!("failed to save local history: {err}");
        }
    }

    if let Some(logged) = &outcome.logged {
        println!("logged #{} at {}", logged.id, logged.created_at);
    }
    println!("{}", outcome.external_url);
    Ok(())
}

async fn list(config: &ResolvedClientConfig) -> Result<()> {
    let client = LogServiceClient::new(&config.log_service)?;
    let entries = client
        .list_recent()
        .await
        .context("failed to fetch recent entries")?;
    for entry in entries {
        println!(
            "{:>6}  {}  {:<24} {:<16} {:>4} min",
            entry.id, entry.created_at, entry.member, entry.activity, entry.duration
        );
    }
    Ok(())
}

async fn history(config: &ResolvedClientConfig) -> Result<()> {
    let Some(settings) = &config.history else {
        bail!("local history is disabled; set enable_local_history in the client config");
    };
    let recent = load_history(&settings.path).await;

    println!("Recent");
    for entry in &recent.entries {
        let marker = if entry.logged { ' ' } else { '!' };
        println!(
            "{marker} {}  {:<24} {:<16} {:>4} min",
            entry.submitted_at, entry.member, entry.activity, entry.duration
        );
    }

    println!();
    println!("Leaderboard");
    for (rank, row) in build_leaderboard(&recent).iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:>6} min  ({} entries)",
            rank + 1,
            row.member,
            row.total_minutes,
            row.entries
        );
    }
    Ok(())
}
