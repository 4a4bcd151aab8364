use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    #[default]
    Draft,
    Processing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayrollItemStatus {
    #[default]
    Pending,
    Approved,
    Paid,
    OnHold,
}

/// A labelled allowance or deduction line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayComponent {
    pub label: String,
    pub amount: Decimal,
}

impl PayComponent {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

pub fn component_total(components: &[PayComponent]) -> Decimal {
    components.iter().map(|c| c.amount).sum()
}

/// A batch of computed compensation covering one pay period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payroll {
    pub id: Uuid,
    pub reference: String,
    pub status: PayrollStatus,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub academic_period_id: Option<Uuid>,
    /// When non-empty, generation only considers these staff members.
    #[serde(default)]
    pub staff_filter: Vec<Uuid>,
    pub currency: String,
    pub total_base: Decimal,
    pub total_allowances: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl Payroll {
    pub fn new(
        reference: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference: reference.into(),
            status: PayrollStatus::Draft,
            period_start,
            period_end,
            academic_period_id: None,
            staff_filter: Vec::new(),
            currency: currency.into(),
            total_base: Decimal::ZERO,
            total_allowances: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            total_net: Decimal::ZERO,
            processed_at: None,
        }
    }

    /// Overwrites the four rollup totals; they are always recomputed from the
    /// payroll's items, never hand-edited.
    pub fn apply_rollups(&mut self, totals: RollupTotals) {
        self.total_base = totals.base;
        self.total_allowances = totals.allowances;
        self.total_deductions = totals.deductions;
        self.total_net = totals.net;
    }
}

/// Sums of the item fields a payroll rolls up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupTotals {
    pub base: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net: Decimal,
}

impl RollupTotals {
    pub fn of<'a>(items: impl Iterator<Item = &'a PayrollItem>) -> Self {
        let mut totals = Self::default();
        for item in items {
            totals.base += item.base_salary;
            totals.allowances += item.allowances_total;
            totals.deductions += item.deductions_total;
            totals.net += item.net_amount;
        }
        totals
    }
}

/// One staff member's computed pay inside a payroll. At most one item may
/// exist per (payroll, staff) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollItem {
    pub id: Uuid,
    pub payroll_id: Uuid,
    pub staff_id: Uuid,
    pub status: PayrollItemStatus,
    pub base_salary: Decimal,
    pub allowances: Vec<PayComponent>,
    pub allowances_total: Decimal,
    pub deductions: Vec<PayComponent>,
    pub deductions_total: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PayrollItem {
    pub fn new(payroll_id: Uuid, staff_id: Uuid, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payroll_id,
            staff_id,
            status: PayrollItemStatus::Pending,
            base_salary: Decimal::ZERO,
            allowances: Vec::new(),
            allowances_total: Decimal::ZERO,
            deductions: Vec::new(),
            deductions_total: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            currency: currency.into(),
            notes: None,
        }
    }

    /// Recomputes the cached component totals and the net amount, flooring
    /// the net at zero.
    pub fn recompute(&mut self) {
        self.allowances_total = component_total(&self.allowances);
        self.deductions_total = component_total(&self.deductions);
        self.net_amount =
            (self.base_salary + self.allowances_total - self.deductions_total).max(Decimal::ZERO);
    }
}
