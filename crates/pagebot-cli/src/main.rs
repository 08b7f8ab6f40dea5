//! pagebot - chat with a model that can read and fill the current page

mod config;
mod store;

use std::sync::Arc;

use clap::Parser;

use pagebot_agent::{
    Action, AgentEvent, AssistantTurn, ContextWindowBuilder, Dispatcher, DispatcherConfig,
    Evaluator, ProviderTransport,
};
use pagebot_ai::{Model, OpenAiProvider, Role};
use pagebot_page::PageSession;

/// pagebot - a page-aware chat agent
#[derive(Parser, Debug)]
#[command(name = "pagebot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTML file to attach the conversation to
    #[arg(short = 'f', long)]
    page: Option<String>,

    /// URL to tell the model the page came from
    #[arg(long)]
    url: Option<String>,

    /// Model to use (default: gpt-4o)
    #[arg(short, long)]
    model: Option<String>,

    /// Run a single prompt non-interactively and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Resume a previous conversation by ID
    #[arg(long)]
    resume: Option<String>,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Stand-in evaluator for a host without a JavaScript sandbox.
///
/// Honors the boundary protocol (the payload carries the expected result
/// key) so the model learns the tool is unavailable and re-plans, instead
/// of every Calculate round dying as a protocol violation.
struct NoSandbox;

#[async_trait::async_trait]
impl Evaluator for NoSandbox {
    async fn evaluate(&self, _source: &str) -> serde_json::Value {
        serde_json::json!({
            "calculationResult": "the sandbox evaluator is not available in this host"
        })
    }
}

const BLANK_PAGE: &str =
    "<html><head><title>Blank page</title></head><body></body></html>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pagebot=debug")
            .init();
    }

    if args.init_config {
        let path = config::Config::init()?;
        println!("Config file created at: {}", path.display());
        println!("{}", config::example_config());
        return Ok(());
    }

    let cfg = config::Config::load();
    let api_key = cfg.get_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "no API key: set OPENAI_API_KEY or add api_key to {}",
            config::Config::config_path().display()
        )
    })?;

    let model_id = args
        .model
        .or(cfg.model)
        .unwrap_or_else(|| "gpt-4o".to_string());
    let context_window = cfg.context_window.unwrap_or(128_000);
    let model = match cfg.base_url {
        Some(base_url) => Model::custom(model_id, base_url, context_window),
        None => Model::openai(model_id, context_window),
    };

    let html = match &args.page {
        Some(path) => std::fs::read_to_string(path)?,
        None => BLANK_PAGE.to_string(),
    };

    let provider = Arc::new(OpenAiProvider::new(api_key));
    let transport = Arc::new(ProviderTransport::new(provider, model.clone()));
    let page = Arc::new(PageSession::from_html(html));
    let store = match &args.resume {
        Some(id) => Arc::new(store::FileTranscriptStore::open(id)?),
        None => Arc::new(store::FileTranscriptStore::create()?),
    };
    eprintln!("Conversation: {}", store.id());

    let dispatcher_config = DispatcherConfig {
        context_window: model.context_window,
        ..Default::default()
    };
    let window = ContextWindowBuilder::with_default_preamble(args.url.as_deref());
    let mut dispatcher = Dispatcher::new(
        dispatcher_config,
        window,
        transport,
        page,
        Arc::new(NoSandbox),
    )
    .with_store(store);
    dispatcher.restore()?;

    // Print per-round progress while a turn runs
    let mut events = dispatcher.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AgentEvent::ActionStart { action, .. } => eprintln!("  [{}]", action.kind()),
                AgentEvent::Error { message } => eprintln!("  error: {message}"),
                _ => {}
            }
        }
    });

    if let Some(prompt) = args.command {
        dispatcher.submit(prompt).await?;
        print_response(&dispatcher);
        return Ok(());
    }

    run_repl(&mut dispatcher).await
}

/// Print the text of the model's final Respond action, if the turn ended
/// with one.
fn print_response(dispatcher: &Dispatcher) {
    let last_assistant = dispatcher
        .transcript()
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant);

    if let Some(entry) = last_assistant {
        if let Ok(turn) = AssistantTurn::parse(&entry.content) {
            if let Action::Respond { text_to_display } = turn.next_action {
                println!("{text_to_display}");
                return;
            }
        }
    }
    if let Some(error) = dispatcher.last_error() {
        eprintln!("(turn ended without a response: {error})");
    }
}

async fn run_repl(dispatcher: &mut Dispatcher) -> anyhow::Result<()> {
    use std::io::Write;
    use tokio::io::AsyncBufReadExt;

    println!("Type a message; /clear wipes the transcript, /quit exits.");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" | "/exit" => break,
            "/clear" => {
                dispatcher.clear()?;
                println!("(cleared)");
            }
            _ => {
                dispatcher.submit(line).await?;
                print_response(dispatcher);
            }
        }
    }

    Ok(())
}
