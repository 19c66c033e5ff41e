pub mod pet;
pub mod user;
