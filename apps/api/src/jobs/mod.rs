// Job postings: recruiter CRUD, activation, and the filtered public listing.

pub mod filters;
pub mod handlers;
pub mod queries;
pub mod validation;
