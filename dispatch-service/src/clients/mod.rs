pub mod database;
pub mod directory;
pub mod health;
pub mod job_store;
pub mod memory;
pub mod messaging;
pub mod outcome_store;
pub mod settings;
pub mod template;
