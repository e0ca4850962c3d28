pub mod client;
pub mod dashboard;
pub mod finance;
pub mod marketing;
pub mod project;
pub mod prospect;
pub mod quote;
pub mod support;
pub mod user;
pub mod validation;
