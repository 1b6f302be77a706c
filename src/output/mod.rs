//! Styled terminal output for tfmove
//!
//! Every user-facing line goes through these helpers so the whole run shares one
//! palette. Diagnostics belong in `tracing`, not here.

use owo_colors::OwoColorize;

/// Pastel mint green
const GREEN: (u8, u8, u8) = (152, 225, 152);
/// Pastel coral
const RED: (u8, u8, u8) = (255, 160, 160);
/// Pastel cream
const YELLOW: (u8, u8, u8) = (255, 230, 160);
/// Pastel sky blue
const BLUE: (u8, u8, u8) = (160, 200, 255);
/// Pastel lavender
const LAVENDER: (u8, u8, u8) = (181, 174, 254);
/// Muted grey for keys, separators and secondary text
const GREY: (u8, u8, u8) = (160, 160, 160);

/// Print a success message with a green checkmark
pub fn success(message: &str) {
    println!(
        "{} {}",
        "✓".truecolor(GREEN.0, GREEN.1, GREEN.2).bold(),
        message.bright_white()
    );
}

/// Print an error message to stderr
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".truecolor(RED.0, RED.1, RED.2).bold(),
        message.bright_white()
    );
}

pub fn warning(message: &str) {
    println!(
        "{} {}",
        "⚠".truecolor(YELLOW.0, YELLOW.1, YELLOW.2).bold(),
        message.bright_white()
    );
}

pub fn info(message: &str) {
    println!(
        "{} {}",
        "ℹ".truecolor(BLUE.0, BLUE.1, BLUE.2).bold(),
        message.bright_white()
    );
}

/// Print a section header followed by a separator line
pub fn section(title: &str) {
    println!("\n{}", title.truecolor(LAVENDER.0, LAVENDER.1, LAVENDER.2).bold());
    println!("{}", "─".repeat(50).truecolor(GREY.0, GREY.1, GREY.2));
}

/// Print a step indicator such as `[3/10] Downloading state`
pub fn step(number: usize, total: usize, description: &str) {
    println!(
        "\n{} {}",
        format!("[{}/{}]", number, total)
            .truecolor(LAVENDER.0, LAVENDER.1, LAVENDER.2)
            .bold(),
        description.bright_white()
    );
}

pub fn key_value(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).truecolor(GREY.0, GREY.1, GREY.2),
        value.bright_white()
    );
}

pub fn dimmed(message: &str) {
    println!("{}", message.truecolor(GREY.0, GREY.1, GREY.2));
}

/// Print a bulleted list entry
pub fn list_item(text: &str) {
    println!(
        "  {} {}",
        "•".truecolor(GREY.0, GREY.1, GREY.2),
        text.bright_white()
    );
}

/// Print whether an external tool is usable
pub fn status_check(item: &str, available: bool) {
    if available {
        println!(
            "  {} {} {}",
            "✓".truecolor(GREEN.0, GREEN.1, GREEN.2).bold(),
            item.bright_white(),
            "available".truecolor(GREY.0, GREY.1, GREY.2)
        );
    } else {
        println!(
            "  {} {} {}",
            "✗".truecolor(RED.0, RED.1, RED.2).bold(),
            item.bright_white(),
            "not found".truecolor(GREY.0, GREY.1, GREY.2)
        );
    }
}
