// Console status lines, printed outside the full-screen views

use crate::core::config::Config;
use colored::Colorize;

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("⚠️  Warning: {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display an error message
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Display a dimmed/secondary message
pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}

/// Print where files are watched and filed before the loop starts
pub fn print_watch_summary(config: &Config) {
    println!("{}", "─".repeat(50));
    println!("{}", "PaxSS Scanner".white().bold());
    println!("{}", "─".repeat(50));
    println!(
        "  {:<10} {}",
        "Watching:".white(),
        config.watch_dir.display().to_string().cyan()
    );
    println!(
        "  {:<10} {}",
        "Uploads:".white(),
        config.upload_dir.display().to_string().yellow()
    );
    println!(
        "  {:<10} {}",
        "Local:".white(),
        config.save_dir.display().to_string().yellow()
    );
    println!();

    if !config.save_dir.exists() {
        warn("local archive directory does not exist yet; it will be created on first use");
    }
    dimmed(&format!(
        "Polling every {} ms, unanswered prompts archive locally after {}s. Press Ctrl+C to stop.",
        config.poll_interval.as_millis(),
        config.prompt_timeout.as_secs()
    ));
    println!();
}
