//! Progress lines printed by the goals

use colored::Colorize;

pub fn done(message: &str) {
    println!("{} {message}", "✓".green().bold());
}

pub fn note(message: &str) {
    println!("{} {message}", "→".cyan());
}

pub fn warn(message: &str) {
    println!("{} {message}", "⚠".yellow());
}
