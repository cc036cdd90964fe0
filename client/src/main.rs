use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use common::{AssetInfo, Command, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "bdctl")]
#[command(about = "Backdrop Daemon Control", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a video by filename (see `bdctl list`)
    Play {
        /// Video filename, e.g. ocean.mp4
        name: String,
    },

    /// Play a random video
    Random,

    /// Toggle mute
    Mute,

    /// Set the video volume
    Volume {
        /// Volume between 0.0 and 1.0 (0 mutes)
        #[arg(value_parser = parse_unit_value)]
        value: f64,
    },

    /// Set the opacity of the controls overlay
    Opacity {
        /// Opacity between 0.0 and 1.0
        #[arg(value_parser = parse_unit_value)]
        value: f64,
    },

    /// Turn automatic rotation on or off
    Rotate {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// List available videos
    List,

    /// Query page status
    Query,

    /// Kill the running daemon
    Kill,

    /// Ping the daemon to check if it's running
    Ping,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Play { name } => Command::Play { name },
        Commands::Random => Command::PlayRandom,
        Commands::Mute => Command::ToggleMute,
        Commands::Volume { value } => Command::SetVolume { value },
        Commands::Opacity { value } => Command::SetOpacity { value },
        Commands::Rotate { state } => Command::SetRotation {
            enabled: matches!(state, Toggle::On),
        },
        Commands::List => Command::ListAssets,
        Commands::Query => Command::Query,
        Commands::Kill => Command::Kill,
        Commands::Ping => Command::Ping,
    };

    match send_command(command).await {
        Ok(response) => {
            handle_response(response);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nIs the daemon running? Try starting it with: backdropd");
            std::process::exit(1);
        }
    }
}

/// Slider values are parsed here so the daemon only ever sees numbers
fn parse_unit_value(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;

    if common::is_valid_unit_value(value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0-1.0", value))
    }
}

async fn send_command(command: Command) -> Result<Response> {
    let socket_path = common::get_socket_path();

    let stream = UnixStream::connect(&socket_path).await?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    // Send command
    let command_json = serde_json::to_string(&command)?;
    writer.write_all(command_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    // Read response
    let mut response_line = String::new();
    reader.read_line(&mut response_line).await?;

    let response: Response = serde_json::from_str(&response_line)?;
    Ok(response)
}

fn handle_response(response: Response) {
    match response {
        Response::Ok => {
            println!("✓ Success");
        }
        Response::Error(e) => {
            eprintln!("✗ Error: {}", e);
            std::process::exit(1);
        }
        Response::Status(status) => {
            println!("Page Status:");
            println!("  Version: {}", status.version);
            println!("  Uptime: {}s", status.uptime_secs);
            println!(
                "  Video: {}",
                status.current_video.as_deref().unwrap_or("(none)")
            );
            println!(
                "  Sound: {} (volume {:.0}%)",
                if status.muted { "muted" } else { "on" },
                status.volume * 100.0
            );
            println!("  Overlay opacity: {:.0}%", status.opacity * 100.0);
            if status.rotation.enabled {
                print!("  Rotation: every {}s", status.rotation.interval_secs);
                match status.rotation.next_rotation_secs {
                    Some(secs) => println!(", next in {}s", secs),
                    None => println!(),
                }
            } else {
                println!("  Rotation: off");
            }
        }
        Response::Assets(assets) => {
            println!("Available Videos:");
            for asset in assets {
                println!("  {}", format_asset(&asset));
            }
        }
        Response::Pong => {
            println!("✓ Daemon is running");
        }
    }
}

fn format_asset(asset: &AssetInfo) -> String {
    format!("{} ({}) - {}", asset.display_name, asset.name, asset.path)
}
