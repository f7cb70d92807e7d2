//! Watched instruments and their optional holdings.

use rust_decimal::Decimal;

/// A ticker symbol on the watch list, optionally with a position held in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub holding: Option<Holding>,
}

/// Quantity held and the price paid per unit.
///
/// The purchase price is taken to be in the display currency already; it is
/// never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub quantity: Decimal,
    pub purchase_price: Decimal,
}

impl Instrument {
    /// Creates an instrument that is watched but not held.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            holding: None,
        }
    }

    /// Creates an instrument with a holding attached.
    pub fn with_holding(
        symbol: impl Into<String>,
        quantity: Decimal,
        purchase_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            holding: Some(Holding {
                quantity,
                purchase_price,
            }),
        }
    }

    /// Units held, zero when there is no holding.
    pub fn quantity(&self) -> Decimal {
        self.holding.map_or(Decimal::ZERO, |h| h.quantity)
    }

    /// Price paid per unit, zero when there is no holding.
    pub fn purchase_price(&self) -> Decimal {
        self.holding.map_or(Decimal::ZERO, |h| h.purchase_price)
    }

    /// What the holding cost in total, `None` if it overflows.
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.quantity().checked_mul(self.purchase_price())
    }
}
