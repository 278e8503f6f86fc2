// main.rs - Inicon - Initial Recon Tool
// Purpose: Staged recon pipeline for a single root domain:
//          subdomain enumeration (subfinder) -> concurrent liveness
//          probing -> well-known metafile lookup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use reqwest::Client;
use serde::Serialize;

mod enumeration;
mod liveness;
mod metafiles;
mod reporter;

use liveness::{ProbeConfig, ProbeResult, probe_all};
use reporter::Reporter;

/// Inicon - Initial Recon Tool for subdomain enumeration, live
/// subdomain probing, and metafiles lookup
#[derive(Parser, Debug)]
#[command(
    name = "inicon",
    version,
    about = "Initial recon: subdomain enumeration, live subdomains, and metafiles lookup",
    long_about = r#"
╔═══════════════════════════════════════════════════════════════════╗
║                  INICON - Initial Recon Tool                       ║
╚═══════════════════════════════════════════════════════════════════╝

Pipeline stages:

  1. SUBDOMAIN ENUMERATION  - passive discovery via subfinder
  2. LIVE SUBDOMAIN PROBING - concurrent HTTPS checks, bounded in-flight
  3. METAFILES LOOKUP       - robots.txt, security.txt, sitemap.xml,
                              humans.txt, .well-known/security.txt

EXAMPLES:

  Full pipeline, all result sections:
    inicon -d example.com

  Only the live-subdomain results, with per-host narration:
    inicon -d example.com --livesub -v

  Faster probing, results saved to a directory:
    inicon -d example.com --concurrency 50 -o results/

REQUIRED TOOLS:

  subfinder (https://github.com/projectdiscovery/subfinder)
"#
)]
struct Args {
    /// Domain for recon
    #[arg(short, long)]
    domain: String,

    /// Print only subdomain enumeration results
    #[arg(long)]
    subenum: bool,

    /// Print only live subdomain results
    #[arg(long)]
    livesub: bool,

    /// Print only metafiles results
    #[arg(long)]
    metafiles: bool,

    /// Enable verbose mode (per-host narration)
    #[arg(short, long)]
    verbose: bool,

    /// Maximum concurrent liveness probes
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Per-request timeout in seconds for liveness probes
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Directory to save result files into (created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_banner() {
    println!(
        "{}",
        r#"
╔═══════════════════════════════════════════════════════════════════╗
║   ___       _                                                     ║
║  |_ _|_ __ (_) ___ ___  _ __                                      ║
║   | || '_ \| |/ __/ _ \| '_ \                                     ║
║   | || | | | | (_| (_) | | | |                                    ║
║  |___|_| |_|_|\___\___/|_| |_|                                    ║
║                                                                   ║
║  Inicon - Initial Recon Tool                                      ║
╚═══════════════════════════════════════════════════════════════════╝"#
            .cyan()
            .bold()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    print_banner();

    if args.concurrency == 0 {
        bail!("--concurrency must be at least 1");
    }
    if args.timeout == 0 {
        bail!("--timeout must be at least 1 second");
    }

    let reporter = Reporter::new(args.verbose);

    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("failed to build HTTP client")?;

    // ═══════════════════════════════════════════════════════════════
    // STAGE 1: SUBDOMAIN ENUMERATION
    // ═══════════════════════════════════════════════════════════════
    reporter.stage("STAGE 1: SUBDOMAIN ENUMERATION");
    let subdomains = enumeration::enumerate(&args.domain, reporter).await;

    // ═══════════════════════════════════════════════════════════════
    // STAGE 2: LIVE SUBDOMAIN PROBING
    // ═══════════════════════════════════════════════════════════════
    reporter.stage("STAGE 2: LIVE SUBDOMAIN PROBING");
    let probe_config = ProbeConfig {
        concurrency: args.concurrency,
        timeout: Duration::from_secs(args.timeout),
        ..ProbeConfig::default()
    };
    let probe_result = probe_all(&client, subdomains.clone(), &probe_config, reporter).await;

    // ═══════════════════════════════════════════════════════════════
    // STAGE 3: METAFILES LOOKUP
    // ═══════════════════════════════════════════════════════════════
    reporter.stage("STAGE 3: METAFILES LOOKUP");
    let found_metafiles =
        metafiles::scan(&client, &probe_result.live, &probe_config.scheme, reporter).await;

    // ═══════════════════════════════════════════════════════════════
    // RESULTS
    // ═══════════════════════════════════════════════════════════════
    let print_all = !args.subenum && !args.livesub && !args.metafiles;

    if print_all || args.subenum {
        print_section("Found subdomains", &subdomains);
    }
    if print_all || args.livesub {
        print_section("Live URLs", &probe_result.live);
    }
    if print_all || args.metafiles {
        print_section("Metafiles found", &found_metafiles);
    }

    if let Some(dir) = &args.output {
        save_results(
            dir,
            &args.domain,
            &subdomains,
            &probe_result,
            &found_metafiles,
        )?;
        println!(
            "\n{}",
            format!("[+] Results saved to: {}", dir.display()).green()
        );
    }

    Ok(())
}

fn print_section(title: &str, entries: &[String]) {
    println!("\n{}", format!("[*] {}:", title).cyan().bold());
    println!("{}", "--------------------------------------------".cyan());
    for entry in entries {
        println!("{}", format!("[+] {}", entry).green());
    }
}

#[derive(Serialize)]
struct ScanSummary<'a> {
    domain: &'a str,
    total_subdomains: usize,
    live: usize,
    not_live: usize,
    metafiles_found: usize,
}

/// Write one file per result set plus a JSON summary.
fn save_results(
    dir: &Path,
    domain: &str,
    subdomains: &[String],
    probe_result: &ProbeResult,
    found_metafiles: &[String],
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    write_lines(&dir.join("subdomains.txt"), subdomains)?;
    write_lines(&dir.join("live.txt"), &probe_result.live)?;

    let not_live_lines: Vec<String> = probe_result
        .not_live
        .iter()
        .map(|entry| format!("{} ({})", entry.host, entry.reason))
        .collect();
    write_lines(&dir.join("not_live.txt"), &not_live_lines)?;

    write_lines(&dir.join("metafiles.txt"), found_metafiles)?;

    let summary = ScanSummary {
        domain,
        total_subdomains: subdomains.len(),
        live: probe_result.live.len(),
        not_live: probe_result.not_live.len(),
        metafiles_found: found_metafiles.len(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(dir.join("scan_summary.json"), json)
        .context("failed to write scan_summary.json")?;

    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let content = if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    };
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
