pub mod cli;
pub mod daemon;
pub mod sections;
pub mod tools;

pub use cli::*;
pub use daemon::*;
pub use sections::*;
pub use tools::*;
