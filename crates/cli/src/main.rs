use anyhow::Context;
use clap::Parser;
use doq_client_application::use_cases::QueryUpstreamUseCase;
use doq_client_application::QueryContext;
use doq_client_domain::{CliOverrides, Config, LogFormat, MessageFraming};
use doq_client_infrastructure::{QuicTransport, TracingQueryObserver};
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod bootstrap;

#[derive(Parser)]
#[command(name = "doq-query")]
#[command(version)]
#[command(about = "Send one DNS query over dedicated QUIC (RFC 9250)")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Query deadline in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Name to verify the server certificate against
    #[arg(long, value_name = "NAME")]
    server_name: Option<String>,

    /// Message framing (length-prefixed, stream-delimited)
    #[arg(long, value_name = "MODE")]
    framing: Option<MessageFraming>,

    /// Extra trust anchors (PEM bundle)
    #[arg(long, value_name = "PEM")]
    ca_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Resolver address, `host[:port]` (port defaults to 853)
    server: String,

    /// Domain name to query
    name: String,

    /// Record type
    #[arg(default_value = "A")]
    record_type: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        timeout_ms: cli.timeout_ms,
        framing: cli.framing,
        ca_file: cli.ca_file.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.json_logs.then_some(LogFormat::Json),
    };

    let config = Config::load(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    let server = bootstrap::parse_server(&cli.server, cli.server_name.as_deref())?;
    let record_type = RecordType::from_str(&cli.record_type.to_uppercase())
        .with_context(|| format!("Unknown record type '{}'", cli.record_type))?;

    let transport = QuicTransport::new(&config.client)?
        .with_observer(Arc::new(TracingQueryObserver));
    let use_case = QueryUpstreamUseCase::new(Arc::new(transport));

    let ctx = QueryContext::with_timeout(config.client.timeout());

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling query");
            interrupt.cancel();
        }
    });

    debug!(
        timeout_ms = config.client.timeout_ms,
        framing = config.client.framing.as_str(),
        "Configuration loaded"
    );
    info!(server = %server, name = %cli.name, record_type = %record_type, "Sending DoQ query");

    let response = use_case
        .execute(&ctx, &server, &cli.name, record_type)
        .await
        .with_context(|| format!("DoQ query to {} failed", server))?;

    print_response(&response);
    Ok(())
}

fn print_response(response: &Message) {
    println!(
        ";; rcode: {}, id: {}, answers: {}",
        response.response_code(),
        response.id(),
        response.answers().len()
    );

    for query in response.queries() {
        println!(";{}\t{}\t{}", query.name(), query.query_class(), query.query_type());
    }

    for record in response.answers() {
        println!("{}", record);
    }
}
