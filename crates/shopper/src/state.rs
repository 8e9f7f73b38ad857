//! Cross-stage session record.
//!
//! One [`SessionState`] per workflow run. Every field is written exactly once
//! by the stage that produces it and only read by later stages.

use crate::criteria::ProductCategory;
use crate::result::{ShopperError, ShopperResult};
use serde::{Deserialize, Serialize};

/// A value that may be set at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOnce<T> {
    name: &'static str,
    value: Option<T>,
    writes: u32,
}

impl<T> WriteOnce<T> {
    /// Empty slot called `name` (used in error messages)
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            value: None,
            writes: 0,
        }
    }

    /// Store the value; a second write is refused and leaves the first intact
    pub fn set(&mut self, value: T) -> ShopperResult<()> {
        if self.value.is_some() {
            return Err(ShopperError::invariant(format!(
                "{} written twice",
                self.name
            )));
        }
        self.value = Some(value);
        self.writes += 1;
        Ok(())
    }

    /// The value, if written
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The value, or `MissingState` naming the stage that needed it
    pub fn require(&self, stage: &'static str) -> ShopperResult<&T> {
        self.value.as_ref().ok_or(ShopperError::MissingState {
            field: self.name,
            stage,
        })
    }

    /// Whether the value has been written
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Successful writes so far (0 or 1)
    #[must_use]
    pub const fn write_count(&self) -> u32 {
        self.writes
    }
}

/// Values published by the stages of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Written by Load
    pub temperature: WriteOnce<i32>,
    /// Written by Select
    pub product_category: WriteOnce<ProductCategory>,
    /// Written by AddToCart
    pub added_items: WriteOnce<Vec<String>>,
    /// Written by VerifyCart
    pub verified_total: WriteOnce<u32>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh, empty session
    #[must_use]
    pub const fn new() -> Self {
        Self {
            temperature: WriteOnce::new("temperature"),
            product_category: WriteOnce::new("product_category"),
            added_items: WriteOnce::new("added_items"),
            verified_total: WriteOnce::new("verified_total"),
        }
    }

    /// Serializable copy of what has been written so far
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            temperature: self.temperature.get().copied(),
            product_category: self.product_category.get().copied(),
            added_items: self.added_items.get().cloned(),
            verified_total: self.verified_total.get().copied(),
        }
    }
}

/// Plain view of a [`SessionState`] for reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Temperature read from the home page
    pub temperature: Option<i32>,
    /// Category chosen for the temperature
    pub product_category: Option<ProductCategory>,
    /// Names of the products added to the cart
    pub added_items: Option<Vec<String>>,
    /// Cart total after reconciliation
    pub verified_total: Option<u32>,
}
