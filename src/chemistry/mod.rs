pub mod bonding;
pub mod collision;
pub mod elements;
pub mod sanitize;
pub mod symmetry;
