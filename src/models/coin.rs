// ============================================================================
// Configuration : Coin et Currency
// ============================================================================
// Catalogues statiques des cryptomonnaies suivies et des devises d'affichage.
// Ce ne sont pas des états mutables : l'application garde seulement une
// référence &'static vers l'entrée sélectionnée.
//
// CONCEPT RUST : &'static
// - Les catalogues sont des constantes dans le binaire
// - Pas d'allocation, les références vivent pendant toute l'exécution
// ============================================================================

use ratatui::style::Color;

/// Une cryptomonnaie suivie
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    /// Identifiant CoinGecko (ex: "bitcoin")
    pub id: &'static str,

    /// Nom affiché (ex: "Bitcoin")
    pub name: &'static str,

    /// Symbole (ex: "BTC")
    pub symbol: &'static str,

    /// Couleur d'accent dans le terminal
    pub color: Color,

    /// Icône affichée dans le header
    pub icon: &'static str,
}

/// Une devise fiat pour l'affichage des prix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// Code CoinGecko en minuscules (ex: "usd")
    pub code: &'static str,

    /// Symbole (ex: "$")
    pub symbol: &'static str,

    /// Locale de formatage des nombres (ex: "en-US")
    pub locale: &'static str,
}

pub const COINS: &[Coin] = &[
    Coin {
        id: "bitcoin",
        name: "Bitcoin",
        symbol: "BTC",
        color: Color::Rgb(247, 147, 26),
        icon: "₿",
    },
    Coin {
        id: "ethereum",
        name: "Ethereum",
        symbol: "ETH",
        color: Color::Rgb(98, 126, 234),
        icon: "Ξ",
    },
    Coin {
        id: "solana",
        name: "Solana",
        symbol: "SOL",
        color: Color::Rgb(153, 69, 255),
        icon: "◎",
    },
];

pub const CURRENCIES: &[Currency] = &[
    Currency {
        code: "usd",
        symbol: "$",
        locale: "en-US",
    },
    Currency {
        code: "eur",
        symbol: "€",
        locale: "de-DE",
    },
    Currency {
        code: "gbp",
        symbol: "£",
        locale: "en-GB",
    },
];

impl Coin {
    /// Cherche un coin par identifiant
    pub fn find(id: &str) -> Option<&'static Coin> {
        COINS.iter().find(|coin| coin.id == id)
    }

    /// Coin par défaut : Bitcoin
    pub fn default_coin() -> &'static Coin {
        &COINS[0]
    }

    /// Coin suivant dans le catalogue (cycle)
    pub fn next(&self) -> &'static Coin {
        let index = COINS.iter().position(|c| c.id == self.id).unwrap_or(0);
        &COINS[(index + 1) % COINS.len()]
    }
}

impl Currency {
    /// Cherche une devise par code, insensible à la casse
    pub fn find(code: &str) -> Option<&'static Currency> {
        CURRENCIES
            .iter()
            .find(|currency| currency.code.eq_ignore_ascii_case(code))
    }

    /// Devise par défaut : USD
    pub fn default_currency() -> &'static Currency {
        &CURRENCIES[0]
    }

    /// Devise suivante dans le catalogue (cycle)
    pub fn next(&self) -> &'static Currency {
        let index = CURRENCIES
            .iter()
            .position(|c| c.code == self.code)
            .unwrap_or(0);
        &CURRENCIES[(index + 1) % CURRENCIES.len()]
    }
}
