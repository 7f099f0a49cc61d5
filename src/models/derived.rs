// ============================================================================
// Métriques dérivées : direction et variation jour après jour
// ============================================================================
// Calcul pur sur une fenêtre chronologique de prix. Tout le rendu (bande 7
// jours, grille 365 jours, statistiques) dépend de ce module.
//
// CONCEPTS RUST :
// 1. Fonctions pures : pas d'effet de bord, entrée empruntée (&[T])
// 2. Iterators : windows(), zip, fold
// 3. Enums sans données pour représenter un état fini
// ============================================================================

use crate::models::PricePoint;

/// Direction du prix par rapport au point précédent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    /// Premier point de la fenêtre (pas de comparaison possible)
    Neutral,
}

impl Direction {
    /// Classe une variation : >= 0 est une hausse (0% compte comme Up)
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Flèche Unicode pour l'affichage
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Neutral => "─",
        }
    }
}

/// Un point enrichi de sa comparaison avec le point précédent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPoint {
    pub point: PricePoint,

    /// Prix du point précédent dans la fenêtre (None pour l'index 0)
    pub previous_price: Option<f64>,

    /// (prix - précédent) / précédent * 100, 0.0 pour l'index 0
    pub change_percent: f64,

    pub direction: Direction,
}

impl DerivedPoint {
    /// Point sans prédécesseur (début de fenêtre)
    fn first(point: PricePoint) -> Self {
        Self {
            point,
            previous_price: None,
            change_percent: 0.0,
            direction: Direction::Neutral,
        }
    }

    /// Compare `point` au prix précédent
    ///
    /// Un prix précédent nul donnerait une division par zéro : dans ce cas
    /// (et pour tout résultat non fini) le point est Neutral à 0%.
    fn compared(point: PricePoint, previous_price: f64) -> Self {
        let change_percent = (point.price - previous_price) / previous_price * 100.0;

        if previous_price == 0.0 || !change_percent.is_finite() {
            return Self {
                point,
                previous_price: Some(previous_price),
                change_percent: 0.0,
                direction: Direction::Neutral,
            };
        }

        Self {
            point,
            previous_price: Some(previous_price),
            change_percent,
            direction: Direction::from_change(change_percent),
        }
    }
}

/// Résultat du calcul sur une fenêtre complète
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedWindow {
    pub points: Vec<DerivedPoint>,

    /// Nombre de points en hausse (l'index 0 ne compte jamais)
    pub up_days: usize,

    /// Nombre de points en baisse
    pub down_days: usize,
}

impl DerivedWindow {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Calcule les DerivedPoint et les compteurs Up/Down d'une fenêtre
///
/// La fenêtre est supposée déjà découpée à la taille d'affichage
/// (ex: `series.window(7)`). L'entrée n'est jamais modifiée.
///
/// CONCEPT RUST : windows(2)
/// - Itère sur les paires consécutives [a, b] sans index manuel
/// - Évite les erreurs de bornes (i - 1)
pub fn derive_window(window: &[PricePoint]) -> DerivedWindow {
    let Some(&first) = window.first() else {
        return DerivedWindow::default();
    };

    let mut points = Vec::with_capacity(window.len());
    points.push(DerivedPoint::first(first));
    points.extend(
        window
            .windows(2)
            .map(|pair| DerivedPoint::compared(pair[1], pair[0].price)),
    );

    let (up_days, down_days) = points.iter().fold((0, 0), |(up, down), p| match p.direction {
        Direction::Up => (up + 1, down),
        Direction::Down => (up, down + 1),
        Direction::Neutral => (up, down),
    });

    DerivedWindow {
        points,
        up_days,
        down_days,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(i as i64 * 86_400_000, p))
            .collect()
    }

    #[test]
    fn test_first_point_is_neutral() {
        let derived = derive_window(&window_of(&[100.0]));

        assert_eq!(derived.len(), 1);
        let first = derived.points[0];
        assert_eq!(first.previous_price, None);
        assert_eq!(first.change_percent, 0.0);
        assert_eq!(first.direction, Direction::Neutral);
        assert_eq!(derived.up_days + derived.down_days, 0);
    }

    #[test]
    fn test_empty_window() {
        let derived = derive_window(&[]);
        assert!(derived.is_empty());
        assert_eq!(derived.up_days, 0);
        assert_eq!(derived.down_days, 0);
    }

    #[test]
    fn test_windowed_series_scenario() {
        // Série complète 100, 105, 105, 95 ; fenêtre sur les 3 derniers points
        let series = window_of(&[100.0, 105.0, 105.0, 95.0]);
        let derived = derive_window(&series[1..]);

        let directions: Vec<Direction> = derived.points.iter().map(|p| p.direction).collect();
        assert_eq!(
            directions,
            vec![Direction::Neutral, Direction::Up, Direction::Down]
        );

        assert_eq!(derived.points[1].previous_price, Some(105.0));
        assert_eq!(derived.points[1].change_percent, 0.0);
        assert_eq!(format!("{:.2}", derived.points[2].change_percent), "-9.52");

        assert_eq!(derived.up_days, 1);
        assert_eq!(derived.down_days, 1);
    }

    #[test]
    fn test_counts_cover_all_but_first() {
        let prices = [10.0, 12.0, 11.0, 11.0, 9.5, 20.0, 19.0, 19.5];
        for len in 2..=prices.len() {
            let derived = derive_window(&window_of(&prices[..len]));
            assert_eq!(derived.up_days + derived.down_days, len - 1);
        }
    }

    #[test]
    fn test_change_percent_formula() {
        let derived = derive_window(&window_of(&[80.0, 100.0, 75.0]));

        assert_eq!(derived.points[1].change_percent, (100.0 - 80.0) / 80.0 * 100.0);
        assert_eq!(derived.points[1].direction, Direction::Up);
        assert_eq!(derived.points[2].change_percent, (75.0 - 100.0) / 100.0 * 100.0);
        assert_eq!(derived.points[2].direction, Direction::Down);
    }

    #[test]
    fn test_zero_previous_price_is_neutral() {
        let derived = derive_window(&window_of(&[0.0, 50.0, 40.0]));

        let point = derived.points[1];
        assert_eq!(point.previous_price, Some(0.0));
        assert_eq!(point.direction, Direction::Neutral);
        assert!(point.change_percent.is_finite());

        // Seul le dernier point compte (baisse 50 -> 40)
        assert_eq!(derived.up_days, 0);
        assert_eq!(derived.down_days, 1);
    }

    #[test]
    fn test_input_not_mutated() {
        let window = window_of(&[1.0, 2.0, 3.0]);
        let copy = window.clone();
        let _ = derive_window(&window);
        assert_eq!(window, copy);
    }
}
