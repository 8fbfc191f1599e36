pub mod crx;
pub mod extract;
