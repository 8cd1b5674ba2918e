pub mod capability;
pub mod gate;
pub mod host;
pub mod io;
pub mod permissions;
pub mod settings;

// Re-export key types for easier usage
pub use capability::*;
pub use gate::*;
pub use host::*;
pub use permissions::*;
pub use settings::*;
