pub mod headless;
pub mod session;

pub use headless::ChromeLauncher;
pub use session::{BrowserSession, SessionFactory};
