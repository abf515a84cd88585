//! Canonical in-memory record sets
//!
//! [`RecordBook`] is the single owner of the loaded lots and sales. Readers
//! borrow slices; writers either commit a whole replacement set or apply one
//! confirmed change at a time.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Lot, Sale};

/// Rejected record-set commits
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Duplicate lot id: {0}")]
    DuplicateLotId(String),

    #[error("Duplicate sale id: {0}")]
    DuplicateSaleId(String),
}

/// Owner of the lot and sale collections
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBook {
    lots: Vec<Lot>,
    sales: Vec<Sale>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from freshly loaded sets, rejecting duplicate ids
    pub fn from_parts(lots: Vec<Lot>, sales: Vec<Sale>) -> Result<Self, RecordError> {
        ensure_unique(&lots, |l| &l.id).map_err(RecordError::DuplicateLotId)?;
        ensure_unique(&sales, |s| &s.id).map_err(RecordError::DuplicateSaleId)?;
        Ok(Self { lots, sales })
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn lot(&self, id: &str) -> Option<&Lot> {
        self.lots.iter().find(|l| l.id == id)
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty() && self.sales.is_empty()
    }

    /// Atomically replace every lot. On error the current set is kept.
    pub fn replace_lots(&mut self, lots: Vec<Lot>) -> Result<(), RecordError> {
        ensure_unique(&lots, |l| &l.id).map_err(RecordError::DuplicateLotId)?;
        self.lots = lots;
        Ok(())
    }

    /// Atomically replace every sale. On error the current set is kept.
    pub fn replace_sales(&mut self, sales: Vec<Sale>) -> Result<(), RecordError> {
        ensure_unique(&sales, |s| &s.id).map_err(RecordError::DuplicateSaleId)?;
        self.sales = sales;
        Ok(())
    }

    /// Replace both sets at once; neither changes unless both are valid
    pub fn replace_all(&mut self, lots: Vec<Lot>, sales: Vec<Sale>) -> Result<(), RecordError> {
        *self = Self::from_parts(lots, sales)?;
        Ok(())
    }

    /// Apply a confirmed lot write: replace in place, or append when new
    pub fn upsert_lot(&mut self, lot: Lot) {
        match self.lots.iter_mut().find(|l| l.id == lot.id) {
            Some(existing) => *existing = lot,
            None => self.lots.push(lot),
        }
    }

    /// Apply a confirmed sale write: replace in place, or append when new
    pub fn upsert_sale(&mut self, sale: Sale) {
        match self.sales.iter_mut().find(|s| s.id == sale.id) {
            Some(existing) => *existing = sale,
            None => self.sales.push(sale),
        }
    }

    /// Remove a lot together with its sales. Returns the removed lot and the
    /// number of sales dropped with it.
    pub fn remove_lot(&mut self, id: &str) -> Option<(Lot, usize)> {
        let index = self.lots.iter().position(|l| l.id == id)?;
        let lot = self.lots.remove(index);
        let before = self.sales.len();
        self.sales.retain(|s| s.lot_id != id);
        Some((lot, before - self.sales.len()))
    }

    pub fn remove_sale(&mut self, id: &str) -> Option<Sale> {
        let index = self.sales.iter().position(|s| s.id == id)?;
        Some(self.sales.remove(index))
    }

    /// Sales whose lot is not loaded
    pub fn orphan_sales(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter().filter(|s| self.lot(&s.lot_id).is_none())
    }
}

fn ensure_unique<T>(items: &[T], id: impl Fn(&T) -> &String) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        let key = id(item);
        if !seen.insert(key.as_str()) {
            return Err(key.clone());
        }
    }
    Ok(())
}
