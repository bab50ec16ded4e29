use clap::{Parser, Subcommand};
use reqwest::redirect::Policy;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Audit console CLI for the IP-check gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// JSON listing route.
    #[arg(long, default_value = "/mine/records")]
    records_path: String,

    /// Bulk delete route.
    #[arg(long, default_value = "/mine/delete")]
    delete_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audit records, newest first
    List,
    /// Delete audit records by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // A successful delete answers with a redirect to the HTML page.
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()?;

    match cli.command {
        Commands::List => {
            let res = client
                .get(format!("{}{}", cli.url, cli.records_path))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { ids } => {
            let res = client
                .post(format!("{}{}", cli.url, cli.delete_path))
                .json(&json!({ "deleteIds": &ids }))
                .send()
                .await?;
            if res.status().is_redirection() {
                println!("Deleted {} record(s)", ids.len());
            } else {
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: console returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
