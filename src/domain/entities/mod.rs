pub mod client;
pub mod contact;
