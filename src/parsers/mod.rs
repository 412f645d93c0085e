pub mod project;
pub mod promoter;
pub mod query;


pub use project::extract_project_info;
pub use promoter::extract_promoter_info;
