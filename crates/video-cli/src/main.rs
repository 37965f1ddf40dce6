use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use video_service::VideoMetadata;

mod client;
mod error;
mod output;

use client::VideoClient;
use output::CommandOutput;

#[derive(Parser, Debug)]
#[command(name = "video-cli")]
#[command(about = "Client for the video upload service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct GlobalOpts {
    /// Video service base URL
    #[arg(
        short,
        long,
        global = true,
        env = "VIDEO_SERVICE_URL",
        default_value = "http://localhost:8080"
    )]
    url: String,

    /// JSON output format (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered videos
    List,
    /// Register a new video and print its data URL
    Add(AddArgs),
    /// Upload the binary payload of a registered video
    Upload {
        /// Video id
        id: u64,
        /// File to upload
        file: PathBuf,
        /// MIME type of the file
        #[arg(long, default_value = "video/mp4")]
        content_type: String,
    },
    /// Download the binary payload of a video
    Download {
        /// Video id
        id: u64,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,
    /// Duration in seconds
    #[arg(long)]
    duration: u64,
    #[arg(long, default_value = "video/mp4")]
    content_type: String,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    subject: Option<String>,
}

impl From<AddArgs> for VideoMetadata {
    fn from(args: AddArgs) -> Self {
        VideoMetadata {
            location: args.location,
            subject: args.subject,
            ..VideoMetadata::new(args.title, args.duration).with_content_type(args.content_type)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.global.json;

    if let Err(e) = run(cli) {
        if json {
            CommandOutput::error(format!("{e}"), e.chain().nth(1).map(|s| s.to_string())).print();
        } else {
            eprintln!("Error: {e:#}");
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn run(cli: Cli) -> Result<()> {
    let default_level = match cli.global.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = VideoClient::new(&cli.global.url)?;
    let global = &cli.global;

    match cli.command {
        Commands::List => {
            let videos = client.list().await?;
            if global.json {
                CommandOutput::success(serde_json::to_value(&videos)?).print();
            } else if videos.is_empty() {
                println!("No videos registered");
            } else {
                for video in &videos {
                    println!(
                        "{}\t{}\t{}s\t{}",
                        video.id, video.title, video.duration, video.data_url
                    );
                }
            }
        }
        Commands::Add(args) => {
            let candidate: VideoMetadata = args.into();
            let video = client.add(&candidate).await?;
            if global.json {
                CommandOutput::success(serde_json::to_value(&video)?).print();
            } else {
                println!("Registered video {} at {}", video.id, video.data_url);
            }
        }
        Commands::Upload {
            id,
            file,
            content_type,
        } => {
            let status = client
                .upload_file(id, &file, &content_type)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            if global.json {
                CommandOutput::success(serde_json::to_value(status)?).print();
            } else {
                println!("Video {id}: {:?}", status.state);
            }
        }
        Commands::Download { id, output } => match output {
            Some(path) => {
                let bytes = client
                    .download_to_file(id, &path)
                    .await
                    .with_context(|| format!("Failed to download video {id} to {}", path.display()))?;
                if global.json {
                    CommandOutput::success(serde_json::json!({
                        "id": id,
                        "bytes": bytes,
                        "path": path.display().to_string(),
                    }))
                    .print();
                } else {
                    println!("Wrote {bytes} bytes to {}", path.display());
                }
            }
            None => {
                let mut stdout = tokio::io::stdout();
                client.download(id, &mut stdout).await?;
            }
        },
    }

    Ok(())
}
