pub mod decode;
pub mod echo;
pub mod encode;
pub mod gen;
pub mod validate;
