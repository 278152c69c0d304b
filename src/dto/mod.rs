pub mod assets;
pub mod auth;
pub mod games;
pub mod parlour;
