//! Display formatting shared by the TUI and the one-shot table output

use crate::api::models::{Marketplace, Product, SearchResponse};
use regex::Regex;
use std::sync::OnceLock;

/// A product reduced to the strings shown on its card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub title: String,
    pub price: String,
    pub rating: String,
    pub source: String,
    pub url: String,
    pub image_url: Option<String>,
}

impl ProductCard {
    pub fn from_product(product: &Product, marketplace: Option<Marketplace>) -> Self {
        Self {
            title: product.title.clone(),
            price: format_price(product.price, product.currency.as_deref(), marketplace),
            rating: format_rating(product.rating),
            source: if product.source.trim().is_empty() {
                "Product".to_string()
            } else {
                product.source.clone()
            },
            url: product.url.clone(),
            image_url: product.image_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

/// One card per product, in backend order
pub fn product_cards(response: &SearchResponse, marketplace: Option<Marketplace>) -> Vec<ProductCard> {
    response
        .products
        .iter()
        .map(|p| ProductCard::from_product(p, marketplace))
        .collect()
}

/// Prefix for a currency code. Known codes map to their symbol, unknown
/// codes are printed as-is. Without a code the marketplace decides, and
/// rupees are assumed when that is unknown as well.
pub fn currency_prefix(currency: Option<&str>, marketplace: Option<Marketplace>) -> String {
    let code = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| marketplace.unwrap_or_default().default_currency());

    match code.to_ascii_uppercase().as_str() {
        "INR" => "₹".to_string(),
        "USD" => "$".to_string(),
        _ => format!("{} ", code),
    }
}

pub fn format_price(
    price: Option<f64>,
    currency: Option<&str>,
    marketplace: Option<Marketplace>,
) -> String {
    match price {
        Some(value) if value.is_finite() => format!(
            "{}{}",
            currency_prefix(currency, marketplace),
            group_thousands(value)
        ),
        _ => "N/A".to_string(),
    }
}

/// Zero counts as "no rating" the same way a missing one does
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(value) if value.is_finite() && value != 0.0 => format!("{}", value),
        _ => "N/A".to_string(),
    }
}

/// `1999.0` -> `1,999`, `1234567.5` -> `1,234,567.5`; at most two decimals
pub fn group_thousands(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction != 0 {
        let digits = format!("{:02}", fraction);
        grouped.push('.');
        grouped.push_str(digits.trim_end_matches('0'));
    }

    if value < 0.0 && cents != 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// A run of quick-note text, bold when it was wrapped in `**`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSpan {
    pub text: String,
    pub bold: bool,
}

fn bullet_regex() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| Regex::new(r"^[-*•]\s*").expect("valid bullet regex"))
}

fn bold_regex() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"))
}

/// Split quick notes into bullet lines. Blank lines are dropped, leading
/// bullet markers stripped and `**bold**` runs flagged.
pub fn parse_quick_notes(notes: &str) -> Vec<Vec<NoteSpan>> {
    notes
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = bullet_regex().replace(line, "");
            let mut spans = Vec::new();
            let mut last = 0;

            for caps in bold_regex().captures_iter(&line) {
                let Some(whole) = caps.get(0) else { continue };
                if whole.start() > last {
                    spans.push(NoteSpan {
                        text: line[last..whole.start()].to_string(),
                        bold: false,
                    });
                }
                if let Some(inner) = caps.get(1).filter(|m| !m.as_str().is_empty()) {
                    spans.push(NoteSpan {
                        text: inner.as_str().to_string(),
                        bold: true,
                    });
                }
                last = whole.end();
            }

            if last < line.len() {
                spans.push(NoteSpan {
                    text: line[last..].to_string(),
                    bold: false,
                });
            }
            spans
        })
        .filter(|spans| !spans.is_empty())
        .collect()
}
