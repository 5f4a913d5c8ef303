pub mod batch_deleter;
pub mod cleanup_config;
pub mod cleanup_job;
pub mod cleanup_log;
pub mod cleanup_report;
pub mod cleanup_state;
pub mod job_completion;
pub mod object_lister;

#[cfg(test)]
mod test;
