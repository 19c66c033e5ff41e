pub mod prelude;

pub mod pets;
pub mod users;
