//! List rules command implementation.

use hdl_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules (in dispatch order):\n");
    println!("{:<36} {:<36} Description", "Id", "Name");
    println!("{}", "-".repeat(120));

    for rule in all_rules() {
        println!(
            "{:<36} {:<36} {}",
            rule.id(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nUse --rules to run a subset, by name or id:");
    println!("  hdl-lint check --rules implicit-data-type,prototype-return-data-type");
    println!("  hdl-lint check --rules IMPLICIT_DATA_TYPE_IN_DECLARATION");
}
