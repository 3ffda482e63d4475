//! # Worksheets
//!
//! A `Worksheet` is a saved batch of calculator inputs. It serializes to
//! `.fcw` files as human-readable JSON and is re-evaluated on load; results
//! are never stored.
//!
//! ## Structure
//!
//! ```text
//! Worksheet
//! ├── meta: WorksheetMetadata (version, title, author, timestamps)
//! ├── settings: WorksheetSettings (currency, policy tables)
//! └── items: HashMap<Uuid, CalculationItem>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::{CalculationItem, CreditPayoffInput};
//! use fincalc_core::worksheet::Worksheet;
//!
//! let mut sheet = Worksheet::new("Household 2025", "Sam");
//! sheet.add_item(CalculationItem::CreditPayoff(CreditPayoffInput {
//!     label: "Visa".to_string(),
//!     balance: 5_000.0,
//!     annual_rate_pct: 18.0,
//!     monthly_payment: 200.0,
//!     target_months: None,
//! }));
//!
//! let report = sheet.evaluate_all();
//! assert_eq!(report.entries.len(), 1);
//! assert!(report.entries[0].result.is_ok());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{evaluate, CalculationItem, CalculationOutput};
use crate::equations::FormulaTracker;
use crate::errors::CalcError;
use crate::policy::PolicySet;
use crate::units::Currency;

/// Current schema version for .fcw files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension used by the CLI for worksheets.
pub const FILE_EXTENSION: &str = "fcw";

/// Root worksheet container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub meta: WorksheetMetadata,
    pub settings: WorksheetSettings,
    /// Calculator inputs keyed by UUID, so items keep their identity when
    /// relabelled.
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Worksheet {
    /// Create an empty worksheet with default settings.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Worksheet {
            meta: WorksheetMetadata {
                version: SCHEMA_VERSION.to_string(),
                title: title.into(),
                author: author.into(),
                created: now,
                modified: now,
            },
            settings: WorksheetSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add an item and return its new UUID.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Mutable access; marks the worksheet modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items ordered by (label, id).
    pub fn sorted_items(&self) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|(a_id, a), (b_id, b)| a.label().cmp(b.label()).then_with(|| a_id.cmp(b_id)));
        items
    }

    /// Evaluate every item with the worksheet's policy.
    ///
    /// A failing item is reported in its entry and does not stop the others.
    pub fn evaluate_all(&self) -> WorksheetReport {
        let mut formulas = FormulaTracker::new();
        let mut entries = Vec::with_capacity(self.items.len());

        for (id, item) in self.sorted_items() {
            let result = evaluate(item, &self.settings.policy);
            match &result {
                Ok(_) => {
                    for formula in item.formulas() {
                        formulas.record_for_item(*formula, item.calc_type(), item.label());
                    }
                }
                Err(e) => {
                    tracing::warn!(%id, label = %item.label(), code = e.error_code(), "item failed: {}", e);
                }
            }
            entries.push(WorksheetEntry {
                id: *id,
                label: item.label().to_string(),
                calc_type: item.calc_type().to_string(),
                result,
            });
        }

        tracing::debug!(
            title = %self.meta.title,
            items = entries.len(),
            failed = entries.iter().filter(|e| e.result.is_err()).count(),
            "worksheet evaluated"
        );

        WorksheetReport {
            title: self.meta.title.clone(),
            currency: self.settings.currency,
            entries,
            formulas,
        }
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::new("", "")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksheetMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub title: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksheetSettings {
    /// Display currency; amounts are not converted
    pub currency: Currency,
    /// Policy tables used when evaluating this worksheet
    pub policy: PolicySet,
}

/// Outcome of one worksheet item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorksheetEntry {
    pub id: Uuid,
    pub label: String,
    pub calc_type: String,
    pub result: Result<CalculationOutput, CalcError>,
}

/// Everything produced by [`Worksheet::evaluate_all`].
#[derive(Debug, Clone, Serialize)]
pub struct WorksheetReport {
    pub title: String,
    pub currency: Currency,
    pub entries: Vec<WorksheetEntry>,
    pub formulas: FormulaTracker,
}

impl WorksheetReport {
    pub fn failures(&self) -> impl Iterator<Item = &WorksheetEntry> {
        self.entries.iter().filter(|e| e.result.is_err())
    }
}
