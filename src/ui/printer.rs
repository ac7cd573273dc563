use crate::core::models::StageOutcome;
use crate::core::session::SessionResults;
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

pub fn summary_table(results: &SessionResults) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Items").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for (name, outcome) in results {
        let status = match outcome {
            StageOutcome::Failed { error } => Cell::new(format!("✗ {}", error)).fg(Color::Red),
            ok if ok.item_count() == 0 => Cell::new("• nothing found").fg(Color::Yellow),
            _ => Cell::new("✓ ok").fg(Color::Green),
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(outcome.item_count().to_string()),
            status,
        ]);
    }

    table
}

pub fn print_summary(category: &str, results: &SessionResults) {
    println!(
        "\n{} {}",
        "[+]".green().bold(),
        format!("{} scan completed.", category.to_uppercase()).bold()
    );
    if results.is_empty() {
        println!("    no stages ran");
        return;
    }
    println!("{}", summary_table(results));
}

pub fn print_session(results: &SessionResults) {
    if results.is_empty() {
        println!("{} No scan results in this session.", "[!]".yellow().bold());
        return;
    }

    println!("{}", summary_table(results));
    for (name, outcome) in results {
        match outcome {
            StageOutcome::Subdomains { records } => {
                for r in records {
                    println!("  {} {}", name.cyan(), r.domain);
                }
            }
            StageOutcome::LiveHosts { records } => {
                for r in records {
                    println!(
                        "  {} {} [{}] {}",
                        name.cyan(),
                        r.url,
                        r.status_code.to_string().green(),
                        r.title.dimmed()
                    );
                }
            }
            StageOutcome::Paths { hosts } => {
                for (host, paths) in hosts {
                    println!("  {} {}", name.cyan(), host.bold());
                    for p in paths {
                        println!("    └── {}", p.url);
                    }
                }
            }
            StageOutcome::Failed { .. } => {}
        }
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "[!]".red().bold(), message);
}

pub fn print_info(message: impl std::fmt::Display) {
    println!("{} {}", "[+]".green().bold(), message);
}
