pub mod app;
pub mod components;
pub mod session;

pub use app::App;
