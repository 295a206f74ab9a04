mod classification_view;

pub use classification_view::{
    ClassificationView, ReportOption, OTHER_HEADING, OTHER_HEADING_NO_SUGGESTIONS,
    SUGGESTED_HEADING,
};
