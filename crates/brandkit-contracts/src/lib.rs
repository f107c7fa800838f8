pub mod brand;
pub mod catalog;
pub mod events;
pub mod form;
pub mod i18n;
pub mod models;
pub mod prompt;
pub mod runs;
pub mod session;
