// Business domains
pub mod answers;
pub mod policies;
