pub mod browser;
pub mod export;
pub mod generate;
pub mod import;
