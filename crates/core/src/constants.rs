/// Expense description the ERP uses for financing charges.
///
/// Fetched expense records whose type or description contains this marker
/// indicate the process was already charged, so a second submission would
/// double-charge the client.
pub const FINANCE_CHARGE_MARKER: &str = "ENCARGOS FINANCEIROS";

/// Status assigned to a freshly persisted calculation.
pub const STATUS_CALCULATED: &str = "calculated";

/// Decimal precision for monetary display.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
