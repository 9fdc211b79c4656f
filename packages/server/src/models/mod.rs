pub mod customer;
pub mod image;
pub mod shared;
