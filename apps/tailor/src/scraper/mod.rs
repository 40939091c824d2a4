// Job scraper: sources → persistent stores → relevance filter → tailoring → delivery.
// Runs as a long-lived scheduler; see `scheduler::Scheduler::run_forever`.

pub mod filters;
pub mod job_id;
pub mod processor;
pub mod scheduler;
pub mod sources;
pub mod store;
