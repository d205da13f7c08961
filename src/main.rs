use anyhow::{bail, Context};
use clap::Parser;
use shapematch_core::{Dataset, EngineConfig, QueryVector, RankedResponse, RankedResult, RecordId};
use shapematch_ingest::load_dataset_from_path;
use shapematch_session::{spawn_driver, Session, SessionStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Rank the records most similar to a sculpted shape
#[derive(Parser, Debug)]
#[command(name = "shapematch")]
#[command(about = "Rank records by similarity to a sculpted shape", long_about = None)]
struct Args {
    /// CSV file with a header row
    #[arg(short, long)]
    data: PathBuf,

    /// JSON engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated query values, one per axis
    #[arg(short, long)]
    query: Option<String>,

    /// Use this record's shape as the query
    #[arg(long)]
    adopt: Option<String>,

    /// Number of results to publish
    #[arg(long)]
    top_n: Option<usize>,

    /// Throttle window in milliseconds
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Include pass-through columns in the output
    #[arg(long)]
    attributes: bool,

    /// Read commands from stdin and print every published result
    #[arg(short, long)]
    interactive: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries results; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting shapematch v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to read config {:?}", path))?,
        None => EngineConfig::default(),
    };
    if let Some(n) = args.top_n {
        config.top_n = n;
    }
    if let Some(ms) = args.throttle_ms {
        config.throttle_ms = ms;
    }
    config.validate()?;

    let dataset = load_dataset_from_path(&args.data, &config.dataset)
        .with_context(|| format!("failed to load dataset {:?}", args.data))?;
    let session = Arc::new(Session::new(Arc::new(dataset), &config)?);
    if session.status() == SessionStatus::NoData {
        warn!("No records loaded; every ranking will be empty");
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Arc<RankedResult>>();
    session.subscribe(move |result| {
        let _ = tx.send(Arc::clone(result));
    });
    let driver = spawn_driver(Arc::clone(&session));

    if let Some(raw) = &args.adopt {
        let id = resolve_record_id(raw, session.dataset());
        session.adopt_shape_of(&id)?;
    }
    if let Some(raw) = &args.query {
        session.set_query(parse_query(raw)?)?;
    }

    if args.interactive {
        run_interactive(&session, &mut rx, args.attributes).await?;
    } else {
        // Publish at least once, even for the default query
        session.on_input();
        let result = rx.recv().await.context("session stopped before publishing")?;
        print_result(&result, args.attributes, true)?;
    }

    session.close();
    driver.await?;
    info!("Shutting down...");
    Ok(())
}

async fn run_interactive(
    session: &Session,
    results: &mut mpsc::UnboundedReceiver<Arc<RankedResult>>,
    attributes: bool,
) -> anyhow::Result<()> {
    info!("Commands: axis <i> <value> | query <a,b,..> | reset | adopt <id> | show | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match apply_command(session, line.trim()) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => warn!("{:#}", e),
                }
            }
            Some(result) = results.recv() => {
                print_result(&result, attributes, false)?;
            }
        }
    }

    // Results published while the last command was read are still queued
    for result in drain_published(results) {
        print_result(&result, attributes, false)?;
    }
    // Deliver whatever the last command scheduled
    if let Some(result) = session.flush() {
        print_result(&result, attributes, false)?;
    }
    Ok(())
}

fn drain_published(results: &mut mpsc::UnboundedReceiver<Arc<RankedResult>>) -> Vec<Arc<RankedResult>> {
    let mut pending = Vec::new();
    while let Ok(result) = results.try_recv() {
        pending.push(result);
    }
    pending
}

/// Apply one interactive command. Returns false on `quit`.
fn apply_command(session: &Session, line: &str) -> anyhow::Result<bool> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("axis") => {
            let axis: usize = parts.next().context("missing axis index")?.parse()?;
            let value: f32 = parts.next().context("missing axis value")?.parse()?;
            session.set_axis(axis, value)?;
        }
        Some("query") => {
            session.set_query(parse_query(parts.next().context("missing query values")?)?)?;
        }
        Some("reset") => session.reset_query(),
        Some("adopt") => {
            let raw = parts.next().context("missing record id")?;
            session.adopt_shape_of(&resolve_record_id(raw, session.dataset()))?;
        }
        Some("show") => {
            let query = session.query();
            info!("Query: {:?} (generation {})", query.as_slice(), session.generation());
        }
        Some("quit") | Some("exit") => return Ok(false),
        Some(other) => bail!("unknown command '{}'", other),
    }
    Ok(true)
}

fn parse_query(raw: &str) -> anyhow::Result<QueryVector> {
    let values = raw
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .with_context(|| format!("invalid query value '{}'", v.trim()))
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;
    Ok(QueryVector::new(values))
}

/// Ids from an id column are strings; row-index ids are integers
fn resolve_record_id(raw: &str, dataset: &Dataset) -> RecordId {
    let as_string = RecordId::from(raw);
    if dataset.get(&as_string).is_some() {
        return as_string;
    }
    raw.parse::<u64>().map(RecordId::Integer).unwrap_or(as_string)
}

fn print_result(result: &RankedResult, attributes: bool, pretty: bool) -> anyhow::Result<()> {
    let response = RankedResponse::from_ranked(result, attributes);
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_published_keeps_queued_results_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for generation in 1..=3 {
            tx.send(Arc::new(RankedResult::default().with_generation(generation))).unwrap();
        }

        let drained: Vec<u64> = drain_published(&mut rx).iter().map(|r| r.generation).collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert!(drain_published(&mut rx).is_empty());
    }

    #[test]
    fn test_parse_query() {
        let query = parse_query("1, 0.5 ,0,0,0,2").unwrap();
        assert_eq!(query.as_slice(), &[1.0, 0.5, 0.0, 0.0, 0.0, 1.0]);
        assert!(parse_query("1,x").is_err());
    }
}
