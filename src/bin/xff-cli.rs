use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use xff::forwarded::{resolve_ip, X_FORWARDED_FOR, X_FORWARDED_PORT};
use xff::{XffFilter, XffOptions};

#[derive(Parser)]
#[command(name = "xff-cli")]
#[command(about = "Inspect X-Forwarded-For resolution and trust decisions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the client address an X-Forwarded-For value resolves to
    Resolve {
        header: String,
    },
    /// Report whether a direct peer may supply forwarded headers
    Check {
        peer: String,
        #[arg(long = "allow", value_name = "CIDR")]
        allow: Vec<String>,
    },
    /// Print the peer address a request would be rewritten to
    Compose {
        peer: String,
        #[arg(long = "for", default_value = "")]
        forwarded_for: String,
        #[arg(long = "port", default_value = "")]
        forwarded_port: String,
        #[arg(long = "allow", value_name = "CIDR")]
        allow: Vec<String>,
    },
    /// Send forwarded headers to a running xff-server and print its reply
    Probe {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        #[arg(long = "for")]
        forwarded_for: Option<String>,
        #[arg(long = "port")]
        forwarded_port: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { header } => match resolve_ip(&header) {
            Some(ip) => println!("{}", ip),
            None => println!("(none)"),
        },
        Commands::Check { peer, allow } => {
            let filter = XffFilter::new(&XffOptions { allowed_subnets: allow })?;
            if filter.is_trusted(&peer) {
                println!("trusted");
            } else {
                println!("untrusted");
            }
        }
        Commands::Compose {
            peer,
            forwarded_for,
            forwarded_port,
            allow,
        } => {
            let filter = XffFilter::new(&XffOptions { allowed_subnets: allow })?;
            match filter.resolve(&peer, &forwarded_for, &forwarded_port) {
                Some(resolved) => println!("{}", resolved),
                None => println!("{}", peer),
            }
        }
        Commands::Probe {
            url,
            forwarded_for,
            forwarded_port,
        } => {
            let mut headers = HeaderMap::new();
            if let Some(value) = forwarded_for {
                headers.insert(X_FORWARDED_FOR, HeaderValue::from_str(&value)?);
            }
            if let Some(value) = forwarded_port {
                headers.insert(X_FORWARDED_PORT, HeaderValue::from_str(&value)?);
            }

            let res = reqwest::Client::new().get(&url).headers(headers).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
