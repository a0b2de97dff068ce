pub mod signature;
pub mod xml;
