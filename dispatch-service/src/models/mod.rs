pub mod context;
pub mod health;
pub mod job;
pub mod outcome;
pub mod payload;
pub mod recipient;
pub mod response;
pub mod retry;
pub mod status;
pub mod summary;
pub mod template;
pub mod validation;
