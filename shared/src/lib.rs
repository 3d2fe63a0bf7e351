pub mod config;
pub mod session;
pub mod state;

pub use config::Config;
pub use session::{CookieSession, SessionProvider, SessionUser};
pub use state::AppState;
