// ============================================================================
// Calendriers : bande 7 jours et grille 365 jours
// ============================================================================
// Construit les cellules à partir des DerivedWindow puis les dessine.
//
// - Bande 7 jours : une case par jour (jour, date, prix, flèche + variation)
//   Le jour courant est mis en avant au lieu d'être coloré par direction.
// - Grille annuelle : colonnes = semaines, lignes = jours (dimanche en haut).
//   Des cases vides alignent le premier jour sur sa ligne.
//
// CONCEPTS RUST :
// 1. Génériques avec trait bound : <Tz: TimeZone> pour tester en UTC
//    et afficher en heure locale
// 2. Séparation calcul / rendu : les fonctions de construction sont pures
//    et testables sans terminal
// ============================================================================

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{
    format_compact_price, format_percentage, format_price, Currency, DerivedPoint, DerivedWindow,
    Direction,
};

/// Lignes de la grille : dimanche en premier
const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Largeur d'une case de la grille annuelle (glyphe + espace)
const YEAR_CELL_WIDTH: u16 = 2;

/// En dessous de cette largeur, la bande 7 jours affiche les prix compacts
const COMPACT_PRICE_WIDTH: u16 = 14;

/// Teinte d'une case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTone {
    Up,
    Down,
    Neutral,
    Today,
}

impl CellTone {
    fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => CellTone::Up,
            Direction::Down => CellTone::Down,
            Direction::Neutral => CellTone::Neutral,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            CellTone::Up => Color::Green,
            CellTone::Down => Color::Red,
            CellTone::Neutral => Color::Gray,
            CellTone::Today => Color::Yellow,
        }
    }
}

/// Contenu d'une case de la bande 7 jours
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub day_name: String,
    pub day_number: u32,
    pub price: f64,
    /// "▲ +1.23%", "▼ -0.50%" ou "─ --" pour le premier jour
    pub indicator: String,
    pub tone: CellTone,
}

/// Date d'un point dans le fuseau `tz`
fn point_date<Tz: TimeZone>(point: &DerivedPoint, tz: &Tz) -> Option<NaiveDate> {
    point
        .point
        .datetime()
        .map(|date| date.with_timezone(tz).date_naive())
}

/// Construit les cases de la bande 7 jours
pub fn week_cells<Tz: TimeZone>(week: &DerivedWindow, tz: &Tz, today: NaiveDate) -> Vec<DayCell> {
    week.points
        .iter()
        .filter_map(|derived| {
            let date = point_date(derived, tz)?;

            let change = if derived.previous_price.is_some() {
                format_percentage(derived.change_percent)
            } else {
                "--".to_string()
            };

            let tone = if date == today {
                CellTone::Today
            } else {
                CellTone::from_direction(derived.direction)
            };

            Some(DayCell {
                day_name: date.format("%a").to_string(),
                day_number: date.day(),
                price: derived.point.price,
                indicator: format!("{} {}", derived.direction.arrow(), change),
                tone,
            })
        })
        .collect()
}

/// Place les index de la fenêtre dans la grille semaines × jours
///
/// `leading` : nombre de cases vides avant le premier jour
/// (jour de la semaine du premier point, dimanche = 0)
///
/// Retourne une colonne par semaine, chaque colonne ayant 7 lignes.
pub fn year_columns(leading: usize, len: usize) -> Vec<[Option<usize>; 7]> {
    let total = leading + len;
    let column_count = total.div_ceil(7);

    (0..column_count)
        .map(|column| {
            let mut rows = [None; 7];
            for (row, slot) in rows.iter_mut().enumerate() {
                let cell = column * 7 + row;
                if cell >= leading && cell < total {
                    *slot = Some(cell - leading);
                }
            }
            rows
        })
        .collect()
}

/// Texte d'info-bulle : "Mon, Jan 15, 2024: $42,000.00 (+1.23%)"
pub fn tooltip<Tz: TimeZone>(derived: &DerivedPoint, currency: &Currency, tz: &Tz) -> String {
    let date = point_date(derived, tz)
        .map(|d| d.format("%a, %b %-d, %Y").to_string())
        .unwrap_or_else(|| "?".to_string());

    let change = if derived.previous_price.is_some() {
        format_percentage(derived.change_percent)
    } else {
        "N/A".to_string()
    };

    format!("{}: {} ({})", date, format_price(derived.point.price, currency), change)
}

// ============================================================================
// Rendu
// ============================================================================

/// Dessine la bande 7 jours
pub fn render_week_strip(frame: &mut Frame, area: Rect, week: &DerivedWindow, currency: &Currency) {
    let cells = week_cells(week, &Local, Local::now().date_naive());
    if cells.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = cells
        .iter()
        .map(|_| Constraint::Ratio(1, cells.len() as u32))
        .collect();

    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints(constraints)
        .split(area);

    for (cell, column) in cells.iter().zip(columns.iter()) {
        let color = cell.tone.color();

        let price = if column.width < COMPACT_PRICE_WIDTH {
            format_compact_price(cell.price)
        } else {
            format_price(cell.price, currency)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        if cell.tone == CellTone::Today {
            block = block.title(" today ").title_alignment(Alignment::Center);
        }

        let text = vec![
            Line::from(Span::styled(
                cell.day_name.clone(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                cell.day_number.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(price),
            Line::from(Span::styled(cell.indicator.clone(), Style::default().fg(color))),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, *column);
    }
}

/// Dessine la grille annuelle, la ligne d'info-bulle et les statistiques
pub fn render_year_grid(frame: &mut Frame, area: Rect, app: &App, year: &DerivedWindow) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 365 days · {} ", app.coin.name));

    let Some(first) = year.points.first() else {
        frame.render_widget(block, area);
        return;
    };

    let leading = first
        .point
        .datetime()
        .map(|date| date.with_timezone(&Local).weekday().num_days_from_sunday() as usize)
        .unwrap_or(0);

    let columns = year_columns(leading, year.len());

    // Si le terminal est trop étroit, on garde les semaines les plus récentes
    let inner_width = area.width.saturating_sub(2 + 4);
    let visible = ((inner_width / YEAR_CELL_WIDTH) as usize).min(columns.len());
    let columns = &columns[columns.len() - visible..];

    let today = Local::now().date_naive();
    let mut lines: Vec<Line> = Vec::with_capacity(10);

    for (row, label) in WEEKDAY_LABELS.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<4}", label),
            Style::default().fg(Color::DarkGray),
        )];

        for column in columns {
            let span = match column[row].and_then(|index| year.points.get(index).map(|p| (index, p))) {
                Some((index, derived)) => {
                    let mut style = Style::default().fg(CellTone::from_direction(derived.direction).color());
                    if point_date(derived, &Local) == Some(today) {
                        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                    }
                    if index == app.selected_day {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Span::styled("■ ", style)
                }
                None => Span::raw("  "),
            };
            spans.push(span);
        }

        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));

    if let Some(selected) = app.selected_point() {
        lines.push(Line::from(Span::styled(
            tooltip(selected, app.currency, &Local),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("{} up days", year.up_days),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} down days", year.down_days),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{derive_window, PricePoint};
    use chrono::Utc;

    const DAY_MS: i64 = 86_400_000;

    /// 2024-01-14 00:00 UTC est un dimanche
    const SUNDAY_MS: i64 = 1_705_190_400_000;

    fn week_window(prices: &[f64]) -> DerivedWindow {
        let points: Vec<PricePoint> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(SUNDAY_MS + i as i64 * DAY_MS, p))
            .collect();
        derive_window(&points)
    }

    #[test]
    fn test_week_cells() {
        let week = week_window(&[100.0, 105.0, 105.0, 95.0]);
        let today = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();

        let cells = week_cells(&week, &Utc, today);

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].day_name, "Sun");
        assert_eq!(cells[0].day_number, 14);
        assert_eq!(cells[0].indicator, "─ --");
        assert_eq!(cells[0].tone, CellTone::Neutral);

        assert_eq!(cells[1].indicator, "▲ +5.00%");
        assert_eq!(cells[1].tone, CellTone::Up);
        assert_eq!(cells[2].indicator, "▲ +0.00%");

        // Le jour courant n'est pas coloré par direction
        assert_eq!(cells[3].tone, CellTone::Today);
        assert_eq!(cells[3].indicator, "▼ -9.52%");
    }

    #[test]
    fn test_year_columns_alignment() {
        // Premier jour un mercredi : 3 cases vides
        let columns = year_columns(3, 10);

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0], [None, None, None, Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(columns[1], [Some(4), Some(5), Some(6), Some(7), Some(8), Some(9), None]);
    }

    #[test]
    fn test_year_columns_full_year() {
        let columns = year_columns(6, 365);
        assert_eq!(columns.len(), 53);

        let placed: usize = columns
            .iter()
            .map(|rows| rows.iter().filter(|slot| slot.is_some()).count())
            .sum();
        assert_eq!(placed, 365);
        assert!(year_columns(0, 0).is_empty());
    }

    #[test]
    fn test_tooltip() {
        let week = week_window(&[100.0, 101.5]);
        let usd = Currency::default_currency();

        assert_eq!(
            tooltip(&week.points[0], usd, &Utc),
            "Sun, Jan 14, 2024: $100.00 (N/A)"
        );
        assert_eq!(
            tooltip(&week.points[1], usd, &Utc),
            "Mon, Jan 15, 2024: $101.50 (+1.50%)"
        );
    }

    #[test]
    fn test_tone_colors() {
        assert_eq!(CellTone::Up.color(), Color::Green);
        assert_eq!(CellTone::Down.color(), Color::Red);
    }
}
