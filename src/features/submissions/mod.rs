pub mod handler;
pub mod models;
pub mod storage;
pub mod validation;

pub use handler::create_submissions_router;
pub use storage::SubmissionStore;
