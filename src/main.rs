mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::Path;

use caption_forge::{
    format_float, local_today, score_batch, AppConfig, CaptionGenerator, GenerationBatch,
    GenerationRequest, Platform, Session, Tier,
};

#[derive(Parser)]
#[command(name = "caption-forge", about = "Marketing caption generator and content planner")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    Generate(GenerateArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long)]
    message: Option<String>,
    #[arg(long)]
    context: Option<String>,
    #[arg(long, default_value = "instagram")]
    platform: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long, default_value = "general")]
    niche: String,
    #[arg(long, default_value = "casual")]
    tone: String,
    #[arg(long, default_value = "engagement")]
    copy_mode: String,
    #[arg(long, default_value = "starter")]
    tier: String,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    details: bool,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            message: None,
            context: None,
            platform: "instagram".to_string(),
            brand: String::new(),
            niche: "general".to_string(),
            tone: "casual".to_string(),
            copy_mode: "engagement".to_string(),
            tier: "starter".to_string(),
            model: None,
            details: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8790)]
    port: u16,
    #[arg(long, default_value = "web")]
    web_root: String,
    #[arg(long, default_value = "starter")]
    tier: String,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Generate(GenerateArgs::default()));

    match command {
        Command::Generate(args) => run_generate(args).await,
        Command::Serve(args) => server::serve(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let (config, _) = AppConfig::load(None).map_err(|err| err.to_string())?;

    let tier = Tier::from_str(&args.tier).ok_or_else(|| format!("invalid tier: {}", args.tier))?;
    let platform = Platform::from_str(&args.platform)
        .ok_or_else(|| format!("invalid platform: {}", args.platform))?;

    let mut request = GenerationRequest::default();
    request.brand = args.brand;
    request.niche = args.niche;
    request.tone = args.tone;
    request.copy_mode = args.copy_mode;
    request.platform = platform;
    request.message = read_text(args.message)?;
    request.extra_context = args.context;

    let generator = CaptionGenerator::from_env(&config.generator, args.model)
        .ok_or_else(|| "OPENAI_API_KEY is not set".to_string())?;

    let today = local_today();
    let mut session = Session::new(tier, config.quota.clone(), today);
    session.ensure_quota(today).map_err(|err| err.to_string())?;

    let candidates = generator.generate(&request).await.map_err(|err| err.to_string())?;
    let batch = score_batch(candidates, &config.scoring);
    session.record_generation(today);

    print_batch(&batch, tier, args.details);

    let quota = session.quota_status(today);
    match quota.limit {
        Some(limit) => println!(
            "Tier: {} | {}/{} generations used today",
            tier.label(),
            quota.used,
            limit
        ),
        None => println!("Tier: {} | unlimited generations", tier.label()),
    }

    Ok(())
}

fn print_batch(batch: &GenerationBatch, tier: Tier, details: bool) {
    for (index, variation) in batch.variations.iter().enumerate() {
        let marker = if batch.recommended == Some(index) {
            " (recommended)"
        } else {
            ""
        };
        println!(
            "Variation {}{}: {}",
            index + 1,
            marker,
            variation.candidate.title
        );
        println!("  Score: {}", format_float(variation.combined, 1));
        println!("  Caption: {}", variation.candidate.caption);
        println!("  Hashtags: {}", variation.candidate.hashtags.join(" "));

        if details {
            if tier.shows_details() {
                println!(
                    "  Heuristic: clarity {} | engagement {} | conversion {} | overall {}",
                    format_float(variation.heuristic.clarity, 1),
                    format_float(variation.heuristic.engagement, 1),
                    format_float(variation.heuristic.conversion, 1),
                    format_float(variation.heuristic.overall, 1)
                );
                println!(
                    "  Model: overall {} | engagement {} | conversion {}",
                    format_float(variation.candidate.model.overall, 1),
                    format_float(variation.candidate.model.engagement, 1),
                    format_float(variation.candidate.model.conversion, 1)
                );
            } else {
                println!("  Detailed scores are available on the Pro tier");
            }
        }

        println!();
    }
}

fn read_text(arg: Option<String>) -> Result<String, String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing caption message: pass --message or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
