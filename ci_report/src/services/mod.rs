//! Report services: issue tracker access and the report sequence.

pub mod github_service;
pub mod issue_tracker;
pub mod report_service;
