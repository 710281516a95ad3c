// External collaborators: Discord and CSV ingestion
pub mod discord;
pub mod platform;
pub mod tabular;
