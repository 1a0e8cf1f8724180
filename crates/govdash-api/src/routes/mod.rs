pub mod health;
pub mod proposals;
