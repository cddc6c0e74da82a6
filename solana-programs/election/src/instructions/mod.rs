pub mod close;
pub mod initialise;
pub mod inspect;
pub mod register;
pub mod vote;

pub use close::*;
pub use initialise::*;
pub use inspect::*;
pub use register::*;
pub use vote::*;
