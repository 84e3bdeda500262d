pub mod import;
pub mod merit;
