// metafiles.rs - Well-known metafile lookup on live hosts
// Purpose: For every live subdomain, check a fixed list of well-known
//          paths (robots.txt and friends) and collect the URLs that
//          answer 200.

use std::time::Duration;

use reqwest::Client;

use crate::reporter::Reporter;

/// Well-known paths checked on every live host
pub const METAFILE_PATHS: &[&str] = &[
    "robots.txt",
    "security.txt",
    "sitemap.xml",
    "humans.txt",
    ".well-known/security.txt",
];

const METAFILE_TIMEOUT: Duration = Duration::from_secs(5);

/// Check each live host for the well-known metafiles, sequentially.
/// Returns the full URLs that responded with 200; anything else
/// (other statuses, connection errors) is skipped.
pub async fn scan(
    client: &Client,
    hosts: &[String],
    scheme: &str,
    reporter: Reporter,
) -> Vec<String> {
    if !hosts.is_empty() {
        reporter.info(&format!(
            "Checking {} live hosts for {} well-known metafiles",
            hosts.len(),
            METAFILE_PATHS.len()
        ));
    }

    let mut found = Vec::new();

    for host in hosts {
        for path in METAFILE_PATHS {
            let url = format!("{}://{}/{}", scheme, host, path);
            match client
                .get(&url)
                .timeout(METAFILE_TIMEOUT)
                .send()
                .await
            {
                Ok(resp) if resp.status().as_u16() == 200 => {
                    reporter.hit(&format!("Found metafile: {}", url));
                    found.push(url);
                }
                Ok(resp) => {
                    reporter.miss(&format!(
                        "Metafile {} not found at {} (status code: {})",
                        path,
                        url,
                        resp.status().as_u16()
                    ));
                }
                Err(e) => {
                    reporter.miss(&format!("Connection error while checking {}: {}", url, e));
                }
            }
        }
    }

    found
}
