pub mod job;

pub use job::{Job, JobFilter, JobList, JobStatus, JobSubmission, JobUpdate};
