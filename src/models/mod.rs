pub mod forecast;
pub mod insight;
pub mod recommendation;

pub use forecast::*;
pub use insight::*;
pub use recommendation::*;
