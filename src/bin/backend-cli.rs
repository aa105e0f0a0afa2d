use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "backend-cli")]
#[command(about = "Poke a running JWT auth backend over HTTP", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8200")]
    url: String,

    /// Mount path of the backend under /v1/auth/
    #[arg(short, long, default_value = "jwt")]
    mount: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the diagnostic UI page and print it
    Ui,
    /// Show generated help for a backend path
    Help { path: String },
    /// Read a backend path
    Read { path: String },
    /// Check the server health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/v1/auth/{}", cli.url.trim_end_matches('/'), cli.mount);

    match cli.command {
        Commands::Ui => {
            let res = client.get(format!("{}/ui", base)).send().await?;
            let status = res.status();
            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let body = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: backend returned status {}", status);
                eprintln!("Response: {}", body);
                return Ok(());
            }
            eprintln!("{} ({})", status, content_type);
            println!("{}", body);
        }
        Commands::Help { path } => {
            let res = client
                .get(format!("{}/{}", base, path.trim_start_matches('/')))
                .query(&[("help", "1")])
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Read { path } => {
            let res = client
                .get(format!("{}/{}", base, path.trim_start_matches('/')))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Health => {
            let res = client
                .get(format!("{}/v1/sys/health", cli.url.trim_end_matches('/')))
                .send()
                .await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: backend returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
