pub mod comparison;
pub mod frr;
pub mod ledger;
pub mod report;
pub mod summary;

pub use comparison::{
    compare, load_ledger, save_comparison, validate_targets, ComparisonFile, ComparisonRecord,
    TargetValidation,
};
pub use ledger::{Ledger, LedgerStats};
pub use report::{render_report, ReportInput};
pub use summary::RunSummary;
