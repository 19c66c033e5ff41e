pub mod account;
pub mod pet;
