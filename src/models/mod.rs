pub mod candidate;
pub mod job;
pub mod match_report;
pub mod profile;
pub mod question_set;
