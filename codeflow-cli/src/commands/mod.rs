pub mod analyze;
pub mod compare;
pub mod project;
pub mod rules;
