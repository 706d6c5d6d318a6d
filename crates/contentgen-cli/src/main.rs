use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use contentgen_contracts::events::EventWriter;
use contentgen_contracts::{ContentType, NormalizedResult, RawForm, SubmissionState};
use contentgen_engine::{
    new_session_id, ClientConfig, ContentEngine, DryrunGenerationClient, GenerationClient,
    GenerationError, HttpGenerationClient, StderrNotifier, SystemClipboard,
};

#[derive(Debug, Parser)]
#[command(
    name = "contentgen",
    version,
    about = "Generate channel-ready content from a URL"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit one URL and print the result.
    Generate(GenerateArgs),
    /// Interactive form: submit, inspect, copy, download, start over.
    Form(ConnectionArgs),
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// Generation service base URL (defaults to CONTENTGEN_API_BASE or http://localhost:8000).
    #[arg(long)]
    api_base: Option<String>,
    /// Request timeout in seconds (defaults to CONTENTGEN_TIMEOUT_S or 300).
    #[arg(long)]
    timeout: Option<f64>,
    #[arg(long, default_value = "contentgen-out")]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    /// Answer locally with canned content instead of calling the service.
    #[arg(long)]
    dryrun: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long)]
    url: String,
    #[arg(long)]
    content_type: String,
    #[arg(long)]
    with_image: bool,
    #[arg(long)]
    image_prompt: Option<String>,
    #[arg(long)]
    aspect_ratio: Option<String>,
    /// Write the rendered page (text and image side by side) here.
    #[arg(long)]
    html: Option<PathBuf>,
    #[arg(long)]
    copy: bool,
    /// Save the generated image into the output directory.
    #[arg(long)]
    download: bool,
    #[command(flatten)]
    connection: ConnectionArgs,
}

const EXIT_GENERATION_FAILED: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("contentgen error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Form(args) => run_form(args),
    }
}

fn build_engine(args: &ConnectionArgs) -> Result<ContentEngine> {
    std::fs::create_dir_all(&args.out)?;
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let events = EventWriter::new(events_path, new_session_id());
    if args.dryrun {
        return ContentEngine::new(
            Box::new(DryrunGenerationClient),
            events,
            Box::new(StderrNotifier),
        );
    }
    let config = ClientConfig::from_env()
        .with_api_base(args.api_base.clone())
        .with_timeout(args.timeout);
    let client = HttpGenerationClient::new(config)?;
    let downloads = client.http().clone();
    let client: Box<dyn GenerationClient> = Box::new(client);
    Ok(ContentEngine::new(client, events, Box::new(StderrNotifier))?.with_download_client(downloads))
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let mut engine = build_engine(&args.connection)?;
    let form = RawForm {
        url: args.url,
        content_type: args.content_type,
        with_image: args.with_image,
        image_prompt_override: args.image_prompt,
        aspect_ratio: args.aspect_ratio,
    };

    match engine.submit(&form) {
        Ok(result) => print_result(result),
        Err(GenerationError::Validation(errors)) => {
            for error in errors.errors() {
                eprintln!("{}: {}", error.field, error.message);
            }
            return Ok(EXIT_INVALID_INPUT);
        }
        // Already reported through the notifier.
        Err(_) => return Ok(EXIT_GENERATION_FAILED),
    }

    if let Some(path) = &args.html {
        engine.write_page(path)?;
        println!("Page written to {}", path.display());
    }
    if args.copy {
        let _ = engine.copy_result(&mut SystemClipboard::new());
    }
    if args.download {
        let _ = engine.download_image(&args.connection.out);
    }
    Ok(0)
}

fn run_form(args: ConnectionArgs) -> Result<i32> {
    let mut engine = build_engine(&args)?;
    let mut clipboard = SystemClipboard::new();
    let choices = ContentType::wire_names().join(", ");

    println!("Content generator ready. Type /help after a result for commands.");

    loop {
        if matches!(engine.session().current(), SubmissionState::Idle) {
            let Some(url) = prompt("URL: ")? else {
                break;
            };
            let Some(content_type) = prompt(&format!("Content type ({choices}): "))? else {
                break;
            };
            let Some(image_answer) = prompt("Generate a cover image? [y/N]: ")? else {
                break;
            };
            let with_image = matches!(image_answer.to_ascii_lowercase().as_str(), "y" | "yes");
            let form = RawForm {
                url,
                content_type,
                with_image,
                ..RawForm::default()
            };
            println!("Generating...");
            match engine.submit(&form) {
                Ok(result) => print_result(result),
                Err(GenerationError::Validation(errors)) => {
                    for error in errors.errors() {
                        println!("  {}: {}", error.field, error.message);
                    }
                }
                Err(_) => println!("Type /new to try again."),
            }
            continue;
        }

        let Some(line) = prompt("> ")? else {
            break;
        };
        match FormCommand::parse(&line) {
            FormCommand::Empty => {}
            FormCommand::Help => println!("Commands: /show /copy /download /html <path> /new /quit"),
            FormCommand::Show => match engine.result() {
                Some(result) => print_result(result),
                None => println!("No result to show."),
            },
            FormCommand::Copy => {
                let _ = engine.copy_result(&mut clipboard);
            }
            FormCommand::Download => {
                let _ = engine.download_image(&args.out);
            }
            FormCommand::Html(path) => {
                let path = path.unwrap_or_else(|| args.out.join("content.html"));
                match engine.write_page(&path) {
                    Ok(()) => println!("Page written to {}", path.display()),
                    Err(err) => println!("Could not write page: {err:#}"),
                }
            }
            FormCommand::New => {
                engine.reset();
                println!("Starting a new generation.");
            }
            FormCommand::Quit => break,
            FormCommand::Unknown(other) => println!("Unknown command {other}. Type /help."),
        }
    }
    Ok(0)
}

/// Slash commands accepted once a submission has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormCommand {
    Empty,
    Help,
    Show,
    Copy,
    Download,
    Html(Option<PathBuf>),
    New,
    Quit,
    Unknown(String),
}

impl FormCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (command, arg) = line
            .split_once(char::is_whitespace)
            .map(|(command, arg)| (command, arg.trim()))
            .unwrap_or((line, ""));
        match command {
            "" => FormCommand::Empty,
            "/help" => FormCommand::Help,
            "/show" => FormCommand::Show,
            "/copy" => FormCommand::Copy,
            "/download" => FormCommand::Download,
            "/html" => FormCommand::Html((!arg.is_empty()).then(|| PathBuf::from(arg))),
            "/new" => FormCommand::New,
            "/quit" | "/exit" => FormCommand::Quit,
            other => FormCommand::Unknown(other.to_string()),
        }
    }
}

/// Reads one trimmed line; `None` on end of input.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    loop {
        match io::stdin().read_line(&mut line) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(line.trim().to_string())),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_result(result: &NormalizedResult) {
    println!("--- {} ---", result.content_type);
    println!("{}", result.display_text);
    if let Some(url) = &result.image_url {
        println!("--- image ---");
        println!("{url}");
    }
}
