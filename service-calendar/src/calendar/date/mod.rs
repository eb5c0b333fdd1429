pub mod date_codec;
pub mod date_ops;
