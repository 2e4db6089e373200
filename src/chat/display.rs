use colored::*;

use crate::summarizer::BundleInfo;

/// Prints a generated summary with a visual break around it.
pub fn print_summary(summary: &str) {
    println!("\n{}", "Summary".cyan().bold());
    println!("{}", "=".repeat(60).bright_black());
    println!("{}", summary.green());
    println!("{}\n", "=".repeat(60).bright_black());
}

/// Prints a validation or empty-result notice.
pub fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

/// Prints a failure reported by the server.
pub fn print_error(message: &str) {
    println!("{}", message.red());
}

/// Prints metadata about the checkpoint the server is holding.
pub fn print_model_info(info: &BundleInfo) {
    println!("\n{}", "Loaded model".cyan().bold());
    println!("{}", "=".repeat(60).bright_black());
    println!("{:<12} {}", "Checkpoint:".bright_white(), info.registry_id.green());
    println!("{:<12} {}", "Device:".bright_white(), info.device.green());
    println!("{:<12} {}", "Vocab size:".bright_white(), info.vocab_size.to_string().green());
    println!(
        "{:<12} {}",
        "Loaded at:".bright_white(),
        info.loaded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().green()
    );
    println!("{}\n", "=".repeat(60).bright_black());
}
