use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the failover router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pool members without probing them
    List,
    /// Probe every instance and show the result
    Health,
    /// Add an instance to the pool
    Add { ip: String, port: u16 },
    /// Remove the instance at a pool position
    Remove { index: usize },
    /// Send a GET through the router
    Get {
        #[arg(default_value = "/process")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::List => client.get(format!("{}/", base)).send().await?,
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Add { ip, port } => {
            client
                .post(format!("{}/add_instance", base))
                .form(&[("ip", ip), ("port", port.to_string())])
                .send()
                .await?
        }
        Commands::Remove { index } => {
            client
                .post(format!("{}/remove_instance", base))
                .form(&[("index", index.to_string())])
                .send()
                .await?
        }
        Commands::Get { path } => {
            let path = if path.starts_with('/') { path } else { format!("/{}", path) };
            client.get(format!("{}{}", base, path)).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
