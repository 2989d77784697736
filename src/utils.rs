pub mod compress;
pub mod datetime;
pub mod net;
pub mod text;
