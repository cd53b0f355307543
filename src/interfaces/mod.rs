pub mod console;
pub mod view_models;
