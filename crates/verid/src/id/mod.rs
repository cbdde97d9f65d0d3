mod verifiable;

pub use verifiable::*;
