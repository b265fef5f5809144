pub mod job_handlers;
pub mod meta_handlers;
pub mod pipeline_handlers;
