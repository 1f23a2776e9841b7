use clap::{Parser, Subcommand, ValueEnum};
use signalflow::ast::DisplayTree;
use signalflow::config::RunConfig;
use signalflow::market::parse_candle_response;
use signalflow::metrics::parse_metrics_response;
use signalflow::prelude::*;
use signalflow::store::{FlowStore, JsonFileStore};
use std::fs;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Validate and compile visual strategy graphs for the execution engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default Start -> EMA(20) -> Output template to a flow file
    Template {
        /// Path of the flow JSON file to create
        flow_path: String,
    },
    /// Report every structural violation of a flow
    Validate {
        flow_path: String,
        /// Accept several root conditions and join them with OR
        #[arg(long)]
        implicit_or: bool,
    },
    /// Compile a flow and print its condition tree
    Compile {
        flow_path: String,
        #[arg(long)]
        implicit_or: bool,
        /// Also print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the outbound request body for a flow
    Request {
        flow_path: String,
        /// Optional path to a run configuration JSON file
        #[arg(short, long)]
        config: Option<String>,
        /// Override the configured symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override the configured timeframe
        #[arg(long)]
        timeframe: Option<String>,
        /// Build a backtest request instead of a validation request
        #[arg(long)]
        backtest: bool,
    },
    /// Decode a reply body saved to a file
    Decode {
        #[arg(value_enum)]
        kind: ReplyKind,
        reply_path: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReplyKind {
    Validation,
    Backtest,
    Metrics,
    Candles,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Command::Template { flow_path } => run_template(&flow_path),
        Command::Validate {
            flow_path,
            implicit_or,
        } => run_validate(&flow_path, policy(implicit_or)),
        Command::Compile {
            flow_path,
            implicit_or,
            json,
        } => run_compile(&flow_path, policy(implicit_or), json),
        Command::Request {
            flow_path,
            config,
            symbol,
            timeframe,
            backtest,
        } => run_request(&flow_path, config, symbol, timeframe, backtest),
        Command::Decode { kind, reply_path } => run_decode(kind, &reply_path),
    }
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn policy(implicit_or: bool) -> RootPolicy {
    if implicit_or {
        RootPolicy::ImplicitOr
    } else {
        RootPolicy::Reject
    }
}

fn run_template(flow_path: &str) {
    let mut store = JsonFileStore::new(flow_path);
    store
        .save(&Graph::default_template().to_snapshot())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write template: {}", e)));
    println!("Default template written to '{}'", flow_path);
}

fn load_graph(flow_path: &str) -> Graph {
    let snapshot = JsonFileStore::new(flow_path)
        .load()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)));
    if snapshot.is_empty() {
        exit_with_error(&format!("No flow found at '{}'", flow_path));
    }
    snapshot
        .into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build graph: {}", e)))
}

fn run_validate(flow_path: &str, root_policy: RootPolicy) {
    let graph = load_graph(flow_path);
    let result = Validator::new().with_root_policy(root_policy).validate(&graph);
    match result.into_result() {
        Ok(()) => println!("Strategy graph is valid ({} nodes)", graph.node_count()),
        Err(violations) => {
            println!("Strategy graph is invalid:");
            for violation in &violations {
                println!("  - {}", violation);
            }
            std::process::exit(2);
        }
    }
}

fn compile_graph(graph: &Graph, root_policy: RootPolicy) -> ConditionTree {
    let compile_start = Instant::now();
    let tree = Compiler::builder(graph)
        .root_policy(root_policy)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    tracing::info!(elapsed = ?compile_start.elapsed(), "compilation finished");
    tree
}

fn run_compile(flow_path: &str, root_policy: RootPolicy, json: bool) {
    let graph = load_graph(flow_path);
    let tree = compile_graph(&graph, root_policy);

    println!("Condition tree:");
    print!("{}", DisplayTree { tree: &tree });
    println!("\nInline: {}", ConditionFormatter::format_inline(&tree));
    if json {
        let rendered = serde_json::to_string_pretty(&tree)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize tree: {}", e)));
        println!("\n{}", rendered);
    }
}

fn run_request(
    flow_path: &str,
    config_path: Option<String>,
    symbol: Option<String>,
    timeframe: Option<String>,
    backtest: bool,
) {
    let mut config = match config_path {
        Some(path) => RunConfig::from_file(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => RunConfig::default(),
    };
    if let Some(symbol) = symbol {
        config.market.symbol = symbol;
    }
    if let Some(timeframe) = timeframe {
        config.market.timeframe = timeframe;
    }

    let graph = load_graph(flow_path);
    let tree = compile_graph(&graph, RootPolicy::Reject);

    let body = if backtest {
        build_backtest_request(config.market, config.order, tree).and_then(|r| r.to_json())
    } else {
        build_strategy_request(config.market, tree).and_then(|r| r.to_json())
    };
    let body = body.unwrap_or_else(|e| exit_with_error(&format!("Failed to build request: {}", e)));
    println!("{}", body);
}

fn run_decode(kind: ReplyKind, reply_path: &str) {
    let raw = fs::read_to_string(reply_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read reply file '{}': {}", reply_path, e))
    });

    match kind {
        ReplyKind::Validation => {
            let outcome = parse_validation_response(&raw)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            println!(
                "{} {}: {}",
                outcome.symbol,
                outcome.timeframe,
                if outcome.valid { "valid" } else { "invalid" }
            );
            for (block, result) in outcome.per_group_results {
                println!("  block {}: {}", block, result);
            }
        }
        ReplyKind::Backtest => {
            let outcome =
                parse_backtest_response(&raw).unwrap_or_else(|e| exit_with_error(&e.to_string()));
            println!(
                "{}: {} trades, total PnL {:.2}",
                outcome.symbol,
                outcome.executed_trades.len(),
                outcome.total_pnl()
            );
            for trade in &outcome.executed_trades {
                println!(
                    "  {} {:?} {} @ {} (pnl {:.2})",
                    trade.timestamp, trade.side, trade.quantity, trade.price, trade.pnl
                );
            }
        }
        ReplyKind::Metrics => {
            let report =
                parse_metrics_response(&raw).unwrap_or_else(|e| exit_with_error(&e.to_string()));
            println!("--- Performance Summary ---");
            println!("PnL:           {:.2} ({:.3}%)", report.pnl_abs, report.pnl_pct);
            println!("CAGR:          {:.2}%", report.cagr);
            println!("Sharpe:        {:.2}", report.sharpe);
            println!("Sortino:       {:.2}", report.sortino);
            println!("Calmar:        {:.2}", report.calmar);
            println!("Max Drawdown:  {:.2}%", report.max_drawdown_pct);
            println!("VaR (95%):     {:.2}", report.value_at_risk_95);
            println!("Total Trades:  {}", report.total_trades);
            println!("Win Rate:      {:.2}%", report.win_rate_pct);
        }
        ReplyKind::Candles => {
            let candles = parse_candle_response(&raw)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            println!("Decoded {} candles", candles.len());
            if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
                println!("  from {} to {}", first.timestamp, last.timestamp);
            }
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
