//! Unswachh operator CLI: moderation, listings, votes and stats against a
//! node's data directory.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use unswachh_node::{
    init_logging, Collaborators, LogFormat, NoPositioning, NodeConfig, UnswachhNode,
};
use unswachh_store::ReportFilter;
use unswachh_types::{Report, ReportId, ReportStatus, VoteChoice, VoterId};

#[derive(Parser)]
#[command(name = "unswachh", about = "Unswachh civic cleanliness report engine")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "UNSWACHH_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for report storage.
    #[arg(long, env = "UNSWACHH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "UNSWACHH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "UNSWACHH_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Browse reports.
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
    /// Moderation (requires the admin password).
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Vote on an approved report as this device.
    Vote {
        id: ReportId,
        /// "up" or "down".
        choice: VoteChoice,
        /// Voter identity; defaults to this device's stored identity.
        #[arg(long, env = "UNSWACHH_VOTER")]
        voter: Option<String>,
    },
    /// Count a visit to the public site.
    Visit,
    /// Report counts and site views.
    Stats {
        /// Print Prometheus metrics instead.
        #[arg(long)]
        metrics: bool,
    },
    /// Follow live changes until interrupted.
    Watch {
        /// "approved" (default), "in-review" or "all".
        #[arg(long, default_value = "approved")]
        status: String,
    },
}

#[derive(clap::Subcommand)]
enum ReportsAction {
    /// List reports.
    List {
        /// "approved" (default), "in-review" or "all".
        #[arg(long, default_value = "approved")]
        status: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Approved reports grouped by region.
    Regions,
    /// One report with its links.
    Show { id: ReportId },
}

#[derive(clap::Subcommand)]
enum AdminAction {
    /// Approve a report in review.
    Approve {
        id: ReportId,
        #[arg(long, env = "UNSWACHH_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Permanently delete a report.
    Delete {
        id: ReportId,
        #[arg(long, env = "UNSWACHH_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the moderation queues, newest first.
    Queue {
        #[arg(long, env = "UNSWACHH_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Store a new admin password in the database.
    SetPassword { new_password: String },
}

fn parse_filter(status: &str) -> anyhow::Result<ReportFilter> {
    if status.eq_ignore_ascii_case("all") {
        return Ok(ReportFilter::All);
    }
    let status: ReportStatus = status
        .parse()
        .with_context(|| format!("unknown status '{status}'"))?;
    Ok(ReportFilter::Status(status))
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path_str = path.to_string_lossy();
            let cfg = NodeConfig::from_toml_file(&path_str)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            cfg
        }
        None => NodeConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        let vote_file = dir.join("votes.json");
        config.data_dir = dir.clone();
        config.vote_file = vote_file;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

/// This device's voter identity, created on first use.
fn device_voter(data_dir: &Path) -> anyhow::Result<VoterId> {
    let path = data_dir.join("voter_id");
    match std::fs::read_to_string(&path) {
        Ok(id) => Ok(VoterId::new(id.trim())?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let voter = VoterId::generate()?;
            std::fs::create_dir_all(data_dir)?;
            std::fs::write(&path, voter.as_str())?;
            tracing::info!(path = %path.display(), "created device voter identity");
            Ok(voter)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn print_report_line(report: &Report) {
    println!(
        "{}  {:<9}  {:>4}  {}  ({})",
        report.id,
        report.status.as_str(),
        report.votes,
        report.title,
        report.display_location()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    let data_dir = config.data_dir.clone();
    let collaborators = Collaborators::from_config(&config, Arc::new(NoPositioning));
    let node = UnswachhNode::open(config, collaborators)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    match cli.command {
        Command::Reports { action } => match action {
            ReportsAction::List { status, json } => {
                let reports = node.reports(parse_filter(&status)?)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                } else {
                    for report in &reports {
                        print_report_line(report);
                    }
                }
            }
            ReportsAction::Regions => {
                for (region, reports) in node.regions()? {
                    println!("{} ({})", region, reports.len());
                    for report in &reports {
                        print!("  ");
                        print_report_line(report);
                    }
                }
            }
            ReportsAction::Show { id } => {
                let report = node.report(&id)?;
                let links = node.links(&report);
                println!("{}", serde_json::to_string_pretty(&report)?);
                println!("maps: {}", links.maps);
                println!("link: {}", links.deep);
            }
        },
        Command::Admin { action } => match action {
            AdminAction::Approve { id, password } => {
                let session = node.login(&password).await?;
                let outcome = node.approve(&session, &id)?;
                println!("{id}: {outcome:?}");
            }
            AdminAction::Delete { id, password } => {
                let session = node.login(&password).await?;
                node.remove(&session, &id)?;
                println!("{id}: deleted");
            }
            AdminAction::Queue { password } => {
                let session = node.login(&password).await?;
                let queue = node.review_queue(&session)?;
                println!("in review ({}):", queue.in_review.len());
                for report in &queue.in_review {
                    print_report_line(report);
                }
                println!("approved ({}):", queue.approved.len());
                for report in &queue.approved {
                    print_report_line(report);
                }
            }
            AdminAction::SetPassword { new_password } => {
                node.set_admin_password(&new_password)?;
                println!("admin password updated");
            }
        },
        Command::Vote { id, choice, voter } => {
            let voter = match voter {
                Some(v) => VoterId::new(v)?,
                None => device_voter(&data_dir)?,
            };
            let effect = node.cast_vote(&voter, &id, choice)?;
            println!("{id}: {:?}, votes now {}", effect.kind, effect.votes);
        }
        Command::Visit => {
            println!("{}", node.record_visit()?);
        }
        Command::Stats { metrics } => {
            if metrics {
                print!("{}", node.metrics.render());
            } else {
                let stats = node.stats()?;
                println!("reports:   {}", stats.total);
                println!("in review: {}", stats.in_review);
                println!("approved:  {}", stats.approved);
                println!("views:     {}", stats.views);
            }
        }
        Command::Watch { status } => {
            // Writes come from other `unswachh` processes, so poll the store.
            let mut feed = node.subscribe_polling(parse_filter(&status)?);
            loop {
                tokio::select! {
                    snapshot = feed.next() => match snapshot {
                        Some(Ok(reports)) => {
                            println!("── {} report(s)", reports.len());
                            for report in &reports {
                                print_report_line(report);
                            }
                        }
                        Some(Err(e)) => tracing::warn!(error = %e, "feed snapshot failed"),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("received SIGINT, stopping watch");
                        break;
                    }
                }
            }
            feed.unsubscribe();
        }
    }

    if let Err(e) = node.flush() {
        bail!("failed to flush database: {e}");
    }
    Ok(())
}
