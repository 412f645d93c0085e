pub mod session;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

pub use session::{BrowserSession, SessionError};
pub use webdriver::WebDriverSession;
