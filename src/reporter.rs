// reporter.rs - Diagnostic narration sink
// Purpose: Centralize verbose-mode narration so the pipeline stages don't
//          thread a verbosity flag through every call. The level check
//          lives here, not at the call sites.

use colored::*;

/// Cheap, copyable sink handed to every pipeline stage.
///
/// Narration (`info`/`hit`/`miss`/`stage`) is suppressed unless verbose
/// mode is on; warnings are always printed.
#[derive(Clone, Copy, Debug)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[allow(dead_code)]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Stage header in the big-banner style
    pub fn stage(&self, title: &str) {
        if self.verbose {
            println!(
                "\n{}",
                "═══════════════════════════════════════════════════════════════"
                    .yellow()
                    .bold()
            );
            println!("{}", format!("  {}", title).yellow().bold());
            println!(
                "{}",
                "═══════════════════════════════════════════════════════════════"
                    .yellow()
                    .bold()
            );
        }
    }

    /// Progress line for work in flight
    pub fn info(&self, msg: &str) {
        if self.verbose {
            println!("{}", format!("[*] {}", msg).cyan());
        }
    }

    /// Positive finding
    pub fn hit(&self, msg: &str) {
        if self.verbose {
            println!("{}", format!("[+] {}", msg).green());
        }
    }

    /// Negative outcome for a single check
    pub fn miss(&self, msg: &str) {
        if self.verbose {
            println!("{}", format!("[-] {}", msg).yellow());
        }
    }

    /// Warnings are shown regardless of verbosity
    pub fn warn(&self, msg: &str) {
        println!("{}", format!("[!] {}", msg).yellow());
    }
}
