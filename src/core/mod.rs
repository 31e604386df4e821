pub mod currency;
pub mod expense;
pub mod participant;
pub mod roster;
