pub mod gateway;
pub mod project;
