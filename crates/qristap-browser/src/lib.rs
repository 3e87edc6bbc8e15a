pub mod error;
pub mod launch;
pub mod locate;
pub mod session;

pub use error::{Error, Result};
pub use locate::{LocateStrategy, VoteEventLocator};
pub use session::{BrowserAutomationSession, QrCapture};
