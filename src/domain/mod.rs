pub mod types;
pub mod contact;
pub mod notification;
pub mod policy;

pub use types::*;
pub use contact::*;
pub use notification::*;
pub use policy::*;
