pub mod report_writer;
pub mod warn_writer;

pub use report_writer::{RemarkReport, ReportWriter};
pub use warn_writer::WarnWriter;
