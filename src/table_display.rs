use crate::api::models::{Marketplace, SearchResponse};
use crate::state::task_steps::{TaskList, TaskStatus};
use crate::ui::format::{parse_quick_notes, product_cards, ProductCard};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use std::path::Path;

/// Build the product table printed by the one-shot mode
pub fn products_table(cards: &[ProductCard]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["#", "Source", "Title", "Price", "Rating", "Link"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for (index, card) in cards.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&card.source),
            Cell::new(&card.title),
            Cell::new(&card.price).fg(Color::Green),
            Cell::new(&card.rating),
            Cell::new(&card.url),
        ]);
    }
    table
}

pub fn display_results(query: &str, response: &SearchResponse, marketplace: Option<Marketplace>) {
    println!("{} {}", "Results for:".dark_grey(), query.bold());
    println!();

    let analysis = response.assistant_text();
    if !analysis.trim().is_empty() {
        println!("{}", "Agent Analysis:".cyan().bold());
        println!("{}", analysis);
        println!();
    }

    if let Some(notes) = response.quick_notes.as_deref() {
        let lines = parse_quick_notes(notes);
        if !lines.is_empty() {
            println!("{}", "Quick Notes:".cyan().bold());
            for spans in lines {
                let line: String = spans
                    .into_iter()
                    .map(|span| {
                        if span.bold {
                            span.text.bold().to_string()
                        } else {
                            span.text
                        }
                    })
                    .collect();
                println!("  • {}", line);
            }
            println!();
        }
    }

    let questions = response.clarifying_questions();
    if !questions.is_empty() {
        println!("{}", "Follow-up questions:".yellow());
        for (index, question) in questions.iter().enumerate() {
            println!("  [{}] {}", index + 1, question);
        }
        println!();
    }

    let cards = product_cards(response, marketplace);
    if cards.is_empty() {
        println!("{}", "No products found.".yellow());
        return;
    }

    println!("{}", products_table(&cards));
    println!("\n{}", format!("{} products returned", cards.len()).green());
}

/// Print the task list as it stood when the submission failed
pub fn display_failure(query: &str, steps: &TaskList, error: &str) {
    println!("{} {}", "Shopping for:".dark_grey(), query.bold());
    for step in steps.steps() {
        let marker = match step.status {
            TaskStatus::Done => "[x]".green(),
            TaskStatus::Error => "[!]".red(),
            TaskStatus::Loading => "[~]".yellow(),
            TaskStatus::Pending => "[ ]".dark_grey(),
        };
        println!("  {} {}", marker, step.label);
    }
    eprintln!("{} {}", "Error:".red().bold(), error);
}

pub fn export_to_csv(cards: &[ProductCard], filename: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(filename)?;

    wtr.write_record(["title", "price", "rating", "source", "url", "image_url"])?;
    for card in cards {
        wtr.write_record([
            card.title.as_str(),
            card.price.as_str(),
            card.rating.as_str(),
            card.source.as_str(),
            card.url.as_str(),
            card.image_url.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    println!(
        "{}",
        format!("Results exported to {}", filename.display()).green()
    );
    Ok(())
}
