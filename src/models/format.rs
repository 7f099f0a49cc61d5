// ============================================================================
// Formatage des prix et pourcentages
// ============================================================================
// Formate les montants selon la locale de la devise :
// - en-US : $50,000.00
// - en-GB : £50,000.00
// - de-DE : 50.000,00 €
// ============================================================================

use crate::models::Currency;

/// Séparateurs et position du symbole pour une locale
struct NumberStyle {
    group: char,
    decimal: char,
    symbol_after: bool,
}

impl NumberStyle {
    fn for_locale(locale: &str) -> Self {
        match locale {
            "de-DE" | "fr-FR" | "es-ES" | "it-IT" => NumberStyle {
                group: '.',
                decimal: ',',
                symbol_after: true,
            },
            _ => NumberStyle {
                group: ',',
                decimal: '.',
                symbol_after: false,
            },
        }
    }
}

/// Insère le séparateur de milliers dans une chaîne de chiffres
///
/// CONCEPT RUST : chars().rev()
/// - On parcourt les chiffres de droite à gauche pour grouper par 3
fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Formate un prix avec 2 décimales, séparateurs et symbole de la devise
pub fn format_price(price: f64, currency: &Currency) -> String {
    let style = NumberStyle::for_locale(currency.locale);

    let fixed = format!("{:.2}", price.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let number = format!(
        "{}{}{}",
        group_thousands(integer, style.group),
        style.decimal,
        fraction
    );

    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };

    if style.symbol_after {
        format!("{}{} {}", sign, number, currency.symbol)
    } else {
        format!("{}{}{}", sign, currency.symbol, number)
    }
}

/// Formate une variation : "+2.11%" ou "-2.50%"
pub fn format_percentage(change: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, change)
}

/// Prix compact pour les cases étroites : "123K", "42.5K", "950"
pub fn format_compact_price(price: f64) -> String {
    if price >= 100_000.0 {
        format!("{:.0}K", price / 1000.0)
    } else if price >= 1000.0 {
        format!("{:.1}K", price / 1000.0)
    } else {
        format!("{:.0}", price)
    }
}
