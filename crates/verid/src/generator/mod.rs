mod lock;
mod mutex;
mod settings;

pub use lock::*;
pub(crate) use mutex::*;
pub use settings::*;
