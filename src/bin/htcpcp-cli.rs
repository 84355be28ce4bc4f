use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "htcpcp-cli")]
#[command(about = "Client for an HTCPCP/1.0 coffee-pot server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:2324")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered pots
    Pots,
    /// Brew a cup (BREW, or POST with --post)
    Brew {
        pot: String,
        /// Accept-Additions value, e.g. "milk-type=Whole-milk;syrup-type=Vanilla"
        #[arg(short, long)]
        additions: Option<String>,
        #[arg(long)]
        post: bool,
    },
    /// Show a pot's status
    Status { pot: String },
    /// Show a pot's brew history
    History { pot: String },
    /// List supported additions (PROPFIND)
    Additions { pot: String },
    /// Say when: stop pouring milk (WHEN)
    When { pot: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Pots => client.get(format!("{}/", base)),
        Commands::Brew { pot, additions, post } => {
            let method = if post { Method::POST } else { Method::from_bytes(b"BREW")? };
            let request = client.request(method, format!("{}/coffee/{}", base, pot));
            match additions {
                Some(additions) => request.header("Accept-Additions", additions),
                None => request,
            }
        }
        Commands::Status { pot } => client.get(format!("{}/coffee/{}/status", base, pot)),
        Commands::History { pot } => client.get(format!("{}/coffee/{}/history", base, pot)),
        Commands::Additions { pot } => client.request(
            Method::from_bytes(b"PROPFIND")?,
            format!("{}/coffee/{}/additions", base, pot),
        ),
        Commands::When { pot } => client.request(
            Method::from_bytes(b"WHEN")?,
            format!("{}/coffee/{}/stop-milk", base, pot),
        ),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        println!("{}", status);
    } else {
        eprintln!("Server answered {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if text.is_empty() => {}
        Err(_) => println!("{}", text),
    }
    Ok(())
}
