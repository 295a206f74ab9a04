mod report_type;

pub use report_type::{ReportCatalog, ReportType};
