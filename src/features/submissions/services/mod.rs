mod classification_poller;
mod geolocation;
mod submission_flow;

pub use classification_poller::ClassificationPoller;
pub use geolocation::{FixedLocation, Geolocator, NoLocation};
pub use submission_flow::{progress_label, ImageUpload, SubmissionFlow, SubmissionState};
