// Job applications: resume intake, match scoring, and listings.

pub mod handlers;
pub mod intake;
pub mod matching;
pub mod storage;
