pub mod base64;
pub mod byte_stream;
pub mod emulation;
pub mod nal_unit;
pub mod rbsp;
