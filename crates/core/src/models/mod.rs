pub mod quote;
pub mod settings;
