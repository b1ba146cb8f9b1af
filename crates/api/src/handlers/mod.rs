pub mod auth;
pub mod campaign;
pub mod character;
pub mod llm;
pub mod lore;
