// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Disposition :
// ┌ header : coin, prix actuel, variation 24h, dernière mise à jour ┐
// ├ bande 7 jours                                                  ┤
// ├ grille 365 jours + info-bulle + up/down days                   ┤
// └ footer : raccourcis ou confirmation de quit                    ┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, DashboardData, View};
use crate::models::{format_percentage, format_price};
use crate::ui::calendar;

/// Hauteur de la bande 7 jours (4 lignes + bordures)
const WEEK_STRIP_HEIGHT: u16 = 6;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Match sur enum pour router
/// - Chargement, données prêtes ou erreur
/// - Le compilateur force à gérer tous les variants
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    match &app.view {
        View::Loading => render_loading(frame, app, chunks[1], chunks[2]),
        View::Ready(data) => {
            calendar::render_week_strip(frame, chunks[1], &data.week, app.currency);
            calendar::render_year_grid(frame, chunks[2], app, &data.year);
        }
        View::Failed(message) => render_error(frame, message, chunks[1], chunks[2]),
    }

    render_footer(frame, app, chunks[3]);
}

/// Crée le layout principal (header, bande, grille, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),                 // Header
            Constraint::Length(WEEK_STRIP_HEIGHT), // Bande 7 jours
            Constraint::Min(0),                    // Grille annuelle
            Constraint::Length(3),                 // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : coin + prix actuel
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} {} ({}) ", app.coin.icon, app.coin.name, app.coin.symbol);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.coin.color))
        .title(Span::styled(
            title,
            Style::default().fg(app.coin.color).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    if app.is_refreshing() {
        block = block.title(
            Title::from(Span::styled(
                " ⟳ refreshing ",
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Right),
        );
    }

    let text = match &app.view {
        View::Ready(data) => header_lines(app, data),
        View::Loading => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Gray),
        ))],
        View::Failed(_) => vec![Line::from(Span::styled(
            "--",
            Style::default().fg(Color::Gray),
        ))],
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn header_lines(app: &App, data: &DashboardData) -> Vec<Line<'static>> {
    let mut price_line = vec![Span::styled(
        format_price(data.current.price, app.currency),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];

    // Variation 24h absente : on n'affiche que le prix
    if let Some(change) = data.current.change_24h {
        let color = if change >= 0.0 { Color::Green } else { Color::Red };
        price_line.push(Span::raw("  "));
        price_line.push(Span::styled(
            format!("{} (24h)", format_percentage(change)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    vec![
        Line::from(price_line),
        Line::from(Span::styled(
            format!(
                "Last updated: {}  ·  {}",
                data.updated_at.format("%H:%M:%S"),
                app.currency.code.to_uppercase()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

// ============================================================================
// États de chargement et d'erreur
// ============================================================================

fn render_loading(frame: &mut Frame, app: &App, week_area: Rect, year_area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Loading {} prices...", app.coin.name),
            Style::default().fg(Color::Gray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 7 days ");
    frame.render_widget(
        Paragraph::new(text.clone()).block(block).alignment(Alignment::Center),
        week_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 365 days ");
    frame.render_widget(
        Paragraph::new(text).block(block).alignment(Alignment::Center),
        year_area,
    );
}

/// Un seul message d'erreur : pas de rendu partiel
fn render_error(frame: &mut Frame, message: &str, week_area: Rect, year_area: Rect) {
    let area = Rect {
        height: week_area.height + year_area.height,
        ..week_area
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Try again"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style),
            Span::raw(" Quit  "),
            Span::styled("[r]", key_style),
            Span::raw(" Refresh  "),
            Span::styled("[c]", key_style),
            Span::raw(format!(" Currency ({})  ", app.currency.code.to_uppercase())),
            Span::styled("[b]", key_style),
            Span::raw(format!(" Coin ({})  ", app.coin.symbol)),
            Span::styled("[←↑↓→ / hjkl]", key_style),
            Span::raw(" Select day  "),
            Span::styled("[Home/End]", key_style),
            Span::raw(" First/Last"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
