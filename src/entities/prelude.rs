pub use super::pets::Entity as Pets;
pub use super::users::Entity as Users;
