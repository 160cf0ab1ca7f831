pub mod quote_client;
pub mod refresh_loop;
pub mod settings_controller;
