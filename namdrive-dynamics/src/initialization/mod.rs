pub use control::*;
pub use electronic::*;
pub use io::*;
pub use nuclear::*;
pub use variables::*;

pub mod control;
pub mod electronic;
pub mod io;
pub mod nuclear;
pub mod variables;
