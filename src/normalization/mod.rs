pub mod performer;
pub mod rating;
