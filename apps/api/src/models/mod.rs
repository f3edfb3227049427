pub mod assets;
pub mod form;
pub mod outline;
