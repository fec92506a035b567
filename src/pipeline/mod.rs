pub mod extract;
pub mod load;
pub mod quantize;
pub mod select;
