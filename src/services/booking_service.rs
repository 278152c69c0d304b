use std::ops::RangeInclusive;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, AppResult, Violation};
use crate::models::{BookableAsset, BookingLine, BookingOrder};

pub const HOURS: RangeInclusive<u32> = 1..=8;
pub const PLAYERS: RangeInclusive<u32> = 1..=4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineField {
    Hours(u32),
    Players(u32),
    Game(String),
}

/// Builds an end-user order with at most one line per asset.
#[derive(Debug, Clone, Default)]
pub struct BookingComposer {
    lines: Vec<BookingLine>,
}

fn check_range(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> AppResult<u32> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(AppError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl BookingComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[BookingLine] {
        &self.lines
    }

    pub fn line(&self, asset_id: &str) -> Option<&BookingLine> {
        self.lines.iter().find(|l| l.asset.id == asset_id)
    }

    /// Starts a fresh line for `asset`, replacing any existing one.
    pub fn add_line(&mut self, asset: BookableAsset) -> &BookingLine {
        let line = BookingLine {
            selected_game: asset.games.first().cloned(),
            asset,
            hours: *HOURS.start(),
            players: *PLAYERS.start(),
        };
        let index = match self.lines.iter().position(|l| l.asset.id == line.asset.id) {
            Some(index) => {
                self.lines[index] = line;
                index
            }
            None => {
                self.lines.push(line);
                self.lines.len() - 1
            }
        };
        &self.lines[index]
    }

    pub fn update_line(&mut self, asset_id: &str, field: LineField) -> AppResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.asset.id == asset_id)
            .ok_or(AppError::NotFound)?;

        match field {
            LineField::Hours(hours) => line.hours = check_range("hours", hours, &HOURS)?,
            LineField::Players(players) => {
                line.players = check_range("players", players, &PLAYERS)?
            }
            LineField::Game(game) => {
                if !line.asset.games.iter().any(|g| *g == game) {
                    return Err(AppError::validation(vec![Violation::UnknownGame(game)]));
                }
                line.selected_game = Some(game);
            }
        }
        Ok(())
    }

    pub fn remove_line(&mut self, asset_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.asset.id != asset_id);
        before != self.lines.len()
    }

    /// Plain `price_per_hour * hours`; happy-hour pricing is not applied.
    pub fn compute_total(&self) -> Decimal {
        self.lines.iter().map(BookingLine::line_total).sum()
    }

    pub fn confirm(&mut self) -> AppResult<BookingOrder> {
        if self.lines.is_empty() {
            return Err(AppError::EmptyOrder);
        }
        let total = self.compute_total();
        let order = BookingOrder {
            id: Uuid::new_v4(),
            lines: std::mem::take(&mut self.lines),
            total,
            created_at: Utc::now(),
        };
        tracing::info!(order_id = %order.id, lines = order.lines.len(), total = %order.total, "booking confirmed");
        Ok(order)
    }
}
