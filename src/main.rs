use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pandu_voice::emergency::LocationInfo;
use pandu_voice::{Config, RuleBasedMatcher, VoiceResponder, demo, wayfinding_guidance};

/// Pandu - voice prompts for the KAI station assistant
#[derive(Parser)]
#[command(name = "pandu", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render every demo scenario to MP3 files
    Demo {
        /// Existing directory to write into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Synthesize text to an MP3 file
    Speak {
        /// Text to speak
        text: String,
        /// Output file (overwritten)
        #[arg(short, long, default_value = "response.mp3")]
        output: PathBuf,
        /// Use the streaming endpoint
        #[arg(long)]
        stream: bool,
    },
    /// Classify an utterance with the keyword rules and print the result as JSON
    Intent {
        /// Rider utterance
        text: String,
    },
    /// Classify an utterance with the configured matcher and voice the reply
    Respond {
        /// Rider utterance
        text: String,
        /// Output file (overwritten)
        #[arg(short, long, default_value = "response.mp3")]
        output: PathBuf,
    },
    /// Print wayfinding guidance for a detected object
    Guide {
        /// Object label (e.g. "Peron 3")
        label: String,
        /// Distance in meters
        distance: f64,
    },
    /// Send an emergency alert to station staff
    Alert {
        #[arg(long, env = "PANDU_USER_ID")]
        user: Option<String>,
        /// Location description
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        platform: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,pandu_voice=info",
        1 => "info,pandu_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Demo {
        out_dir: PathBuf::from("."),
    });

    match command {
        Command::Intent { text } => {
            let response = RuleBasedMatcher::default().matches(&text)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Guide { label, distance } => {
            println!("{}", wayfinding_guidance(&label, distance)?);
            Ok(())
        }
        Command::Demo { out_dir } => {
            let responder = load_responder()?;
            let report = demo::run_all(&responder, &out_dir).await?;
            for path in &report.failed {
                println!("failed: {}", path.display());
            }
            println!(
                "{} audio files written to {}",
                report.written.len(),
                out_dir.display()
            );
            if report.is_complete() {
                Ok(())
            } else {
                anyhow::bail!("{} scenario(s) failed", report.failed.len())
            }
        }
        Command::Speak {
            text,
            output,
            stream,
        } => {
            let responder = load_responder()?;
            if stream {
                let audio = responder.synthesize_to_buffer(&text).await?;
                tokio::fs::write(&output, &audio).await?;
            } else if !responder.synthesize_to_file(&text, &output).await {
                anyhow::bail!("synthesis failed");
            }
            println!("audio saved to {}", output.display());
            Ok(())
        }
        Command::Respond { text, output } => {
            let responder = load_responder()?;
            let (response, audio) = responder.respond(&text).await?;
            tokio::fs::write(&output, &audio).await?;
            println!("{}", response.response_text);
            println!("audio saved to {}", output.display());
            Ok(())
        }
        Command::Alert {
            user,
            location,
            platform,
        } => {
            let responder = load_responder()?;
            let info = LocationInfo {
                user_id: user,
                location,
                platform,
            };
            println!("{}", responder.emergency_assistance(&info).await);
            Ok(())
        }
    }
}

fn load_responder() -> anyhow::Result<VoiceResponder> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");
    Ok(VoiceResponder::from_config(config)?)
}
