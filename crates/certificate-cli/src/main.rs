// certgen - command-line client for the certificate issuer

mod client;
mod preview;

use std::path::PathBuf;

use certificate_core::{CertificateRequest, ObjectLocation, DEFAULT_BUCKET, DEFAULT_REGION};
use clap::{Parser, Subcommand};
use colored::Colorize;

/// certgen - issue and inspect completion certificates
#[derive(Parser)]
#[command(name = "certgen")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a running server to issue a certificate
    Issue {
        /// Recipient id (also names the stored PDF)
        #[arg(long)]
        id: String,

        /// Name printed on the certificate
        #[arg(long)]
        name: String,

        /// Grade printed on the certificate
        #[arg(long)]
        grade: String,

        /// Server base URL
        #[arg(long, default_value = client::DEFAULT_SERVER)]
        server: String,
    },
    /// Print the public URL a certificate is published at
    Url {
        /// Recipient id
        id: String,

        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,

        #[arg(long, default_value = DEFAULT_REGION)]
        region: String,
    },
    /// Render the certificate HTML locally
    Preview {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        grade: String,

        /// Directory holding certificate.html and medal.png
        #[arg(long, default_value = "assets")]
        assets: PathBuf,

        /// Issue date as DD/MM/YYYY (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output file (defaults to <id>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Issue {
            id,
            name,
            grade,
            server,
        } => handle_issue(CertificateRequest::new(id, name, grade), &server),
        Commands::Url { id, bucket, region } => {
            println!("{}", ObjectLocation::new(bucket, region).public_url(&id));
            Ok(())
        }
        Commands::Preview {
            id,
            name,
            grade,
            assets,
            date,
            output,
        } => handle_preview(
            CertificateRequest::new(id, name, grade),
            &assets,
            date.as_deref(),
            output,
        ),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn handle_issue(request: CertificateRequest, server: &str) -> anyhow::Result<()> {
    if request.id.is_empty() {
        anyhow::bail!("--id must not be empty");
    }

    let response = client::issue(server, &request)?;

    println!("{} {}", "✓".green().bold(), response.message.green());
    println!();
    println!("  Id:  {}", request.id);
    println!("  URL: {}", response.url);
    Ok(())
}

fn handle_preview(
    request: CertificateRequest,
    assets: &std::path::Path,
    date: Option<&str>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let date = match date {
        Some(value) => preview::parse_date(value)?,
        None => chrono::Local::now().date_naive(),
    };
    let output = output.unwrap_or_else(|| preview::default_output(&request.id));

    let bytes = preview::write_preview(assets, &request, date, &output)?;

    println!("{} Preview written", "✓".green().bold());
    println!();
    println!("  Output: {}", output.display());
    println!("  Date:   {}", certificate_core::format_date(date));
    println!("  Size:   {} bytes", bytes);
    Ok(())
}
