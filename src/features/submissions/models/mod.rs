mod submission;

pub use submission::{image_key, image_path, Submission, SubmissionStatus};
