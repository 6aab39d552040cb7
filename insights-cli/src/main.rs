//! insights-cli — form-style frontend for the repository insight server
//!
//! Plays the role of the input form: collects repository metadata as flags,
//! submits one action per invocation, and prints the rendered result.
//!
//! # Subcommands
//! - `generate --url <url> --description <text> [--stars N] [--language L]`
//! - `query <text>`  — similarity search over stored insights
//! - `status`        — show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8877";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "insights-cli",
    version,
    about = "GitHub repository insight generator — CLI frontend"
)]
struct Cli {
    /// Insights HTTP server URL (overrides INSIGHTS_HTTP_URL env var)
    #[arg(long, env = "INSIGHTS_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate insights and feature recommendations for a repository
    Generate {
        /// GitHub repository URL
        #[arg(long, default_value = "https://github.com/tensorflow/tensorflow")]
        url: String,

        /// Repository description
        #[arg(long, default_value = "A machine learning library for Python")]
        description: String,

        /// Star count
        #[arg(long, default_value_t = 10000)]
        stars: u64,

        /// Primary language (Python, JavaScript, Java, C++, Other)
        #[arg(long, default_value = "Python")]
        language: String,

        /// Output the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Query stored insights with free text
    Query {
        /// Query text to search insights with
        query: String,

        /// Output the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show insights server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Response from POST /generate
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub insights: String,
    pub recommendations: String,
    pub took_ms: Option<u64>,
}

/// Response from POST /query
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub result: String,
}

// ============================================================================
// Output formatting
// ============================================================================

/// Input data preview, printed before submitting the form.
pub fn format_preview(url: &str, description: &str, stars: u64, language: &str) -> String {
    format!(
        "Repo URL: {url}\nDescription: {description}\nStars: {stars}\nLanguage: {language}\n"
    )
}

/// Human-readable rendering of a generate response.
pub fn format_generate_output(resp: &GenerateResponse) -> String {
    let mut out = String::new();
    out.push_str("Generated Insights\n");
    out.push_str("------------------\n");
    out.push_str(&resp.insights);
    out.push_str("\n\nFeature Recommendations\n");
    out.push_str("-----------------------\n");
    out.push_str(&resp.recommendations);
    out.push('\n');
    if let Some(ms) = resp.took_ms {
        out.push_str(&format!("\n({} ms)\n", ms));
    }
    out
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn do_generate(
    server: &str,
    url: &str,
    description: &str,
    stars: u64,
    language: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    eprintln!("{}", format_preview(url, description, stars, language));
    eprintln!("Generating insights and recommendations...");

    let client = reqwest::blocking::Client::new();
    let endpoint = format!("{}/generate", server);
    let body = serde_json::json!({
        "url": url,
        "description": description,
        "stars": stars,
        "language": language,
    });

    let resp = match client.post(&endpoint).json(&body).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("insights-cli: connection failed to {}: {}", endpoint, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body: serde_json::Value = resp.json().unwrap_or_default();
        let message = body["error"].as_str().unwrap_or("unknown error");
        eprintln!("insights-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }

    if json_output {
        let raw: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let generate_resp: GenerateResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("insights-cli: failed to parse generate response: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", format_generate_output(&generate_resp));
    Ok(())
}

fn do_query(server: &str, query: &str, json_output: bool) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::new();
    let endpoint = format!("{}/query", server);
    let body = serde_json::json!({ "query": query });

    let resp = match client.post(&endpoint).json(&body).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("insights-cli: connection failed to {}: {}", endpoint, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body: serde_json::Value = resp.json().unwrap_or_default();
        let message = body["error"].as_str().unwrap_or("unknown error");
        eprintln!("insights-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }

    if json_output {
        let raw: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let query_resp: QueryResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("insights-cli: failed to parse query response: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", query_resp.result);
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    let resp = client.get(&url).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Insights server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:         {}", body["version"].as_str().unwrap_or("?"));
            println!("Index:           {}", body["index"].as_str().unwrap_or("?"));
            println!("Host:            {}", body["host"].as_str().unwrap_or("?"));
            println!("Ready:           {}", body["ready"].as_bool().unwrap_or(false));
        }
        Ok(r) => {
            let status = r.status();
            eprintln!("insights-cli: server unhealthy (HTTP {})", status);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("insights-cli: cannot reach {} — {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Generate {
            url,
            description,
            stars,
            language,
            json,
        } => do_generate(&server, &url, &description, stars, &language, json),
        Commands::Query { query, json } => do_query(&server, &query, json),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("insights-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
