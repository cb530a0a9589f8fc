#![forbid(unsafe_code)]
#![allow(clippy::print_stdout)]

use clap::Parser;
use hookbox::services::signature_service::compute_signature;

/// Signs a webhook body and prints a ready-to-run curl command.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Exact JSON body to sign
    body: String,

    /// Shared webhook secret
    #[arg(long, env = "WEBHOOK_SECRET", default_value = "testsecret", hide_env_values = true)]
    secret: String,

    /// Base URL of the API listener
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    serde_json::from_str::<serde_json::Value>(&args.body)
        .map_err(|e| anyhow::anyhow!("Body is not valid JSON: {e}"))?;

    let signature = compute_signature(args.body.as_bytes(), args.secret.as_bytes());

    println!("Body: {}", args.body);
    println!("Signature: {signature}");
    println!();
    println!("Curl command:");
    println!("curl -X POST {}/webhook \\", args.url.trim_end_matches('/'));
    println!("  -H \"Content-Type: application/json\" \\");
    println!("  -H \"X-Signature: {signature}\" \\");
    println!("  -d '{}'", args.body);

    Ok(())
}
