use std::collections::BTreeMap;
use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::SchoolError;
use crate::school::{FeeStatus, FeeType, GradeLevel};

/// Settings governing promotion billing: whether fees are generated at all,
/// the defaults applied to generated fees, and an optional flat per-grade
/// amount used when no template matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionBilling {
    pub enabled: bool,
    pub default_fee_type: FeeType,
    pub default_status: FeeStatus,
    pub currency: String,
    /// Days after the target period's start before a generated fee falls due.
    pub due_in_days: i64,
    /// Flat fallback amounts keyed by grade level.
    #[serde(default)]
    pub flat_amounts: BTreeMap<u8, Decimal>,
}

impl Default for PromotionBilling {
    fn default() -> Self {
        Self {
            enabled: true,
            default_fee_type: FeeType::Tuition,
            default_status: FeeStatus::Pending,
            currency: "USD".into(),
            due_in_days: 30,
            flat_amounts: BTreeMap::new(),
        }
    }
}

impl PromotionBilling {
    pub fn flat_amount_for(&self, grade: GradeLevel) -> Option<Decimal> {
        self.flat_amounts.get(&grade.0).copied()
    }

    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self, SchoolError> {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves settings to `path` atomically by staging to a temporary file.
    pub fn save(&self, path: &Path) -> Result<(), SchoolError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}
