//! List checks command implementation.

use srctidy_checks::all_checks;
use srctidy_core::Check;

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<8} {:<18} {:<18} Description", "Code", "Name", "Slug");
    println!("{}", "-".repeat(90));

    for check in all_checks() {
        println!(
            "{:<8} {:<18} {:<18} {}",
            check.code(),
            check.name(),
            check.kind().slug(),
            check.description()
        );
    }

    println!("\nFixes are applied in this order:");
    for kind in srctidy_core::CheckKind::APPLICATION_ORDER {
        println!("  {kind}");
    }

    println!("\nUse --checks to run a subset, e.g.:");
    println!("  srctidy check --checks NoTabs,UnixEOL");
    println!("  srctidy fix --checks ST001,ST004");
}
