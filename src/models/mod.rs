pub mod lookup;
pub mod user;
pub mod vacancy;
