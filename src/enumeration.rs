// enumeration.rs - Passive subdomain discovery via subfinder
// Purpose: Run subfinder as an external producer of candidate
//          subdomains. Failures here are never fatal to the pipeline:
//          a missing binary or a non-zero exit just means zero
//          candidates to probe.

use tokio::process::Command;

use crate::reporter::Reporter;

/// Enumerate candidate subdomains for `domain` with
/// `subfinder -d <domain> -silent`.
///
/// Returns an empty list when subfinder is missing or fails.
pub async fn enumerate(domain: &str, reporter: Reporter) -> Vec<String> {
    reporter.info(&format!("Starting subdomain enumeration for {}", domain));

    let output = match Command::new("subfinder")
        .args(["-d", domain, "-silent"])
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            reporter.warn(&format!(
                "Failed to run subfinder (is it installed?): {}",
                e
            ));
            return Vec::new();
        }
    };

    if !output.status.success() {
        reporter.warn(&format!(
            "subfinder exited with an error for {}",
            domain
        ));
        return Vec::new();
    }

    let subdomains = parse_tool_output(&String::from_utf8_lossy(&output.stdout));
    reporter.hit(&format!(
        "Subdomain enumeration completed. Found {} subdomains",
        subdomains.len()
    ));

    subdomains
}

/// Split newline-delimited tool output into trimmed, non-empty
/// hostnames, preserving the tool's order.
pub fn parse_tool_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
