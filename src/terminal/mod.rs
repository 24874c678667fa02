//! Terminal-facing pieces: capabilities, output assembly and the raw-mode
//! session.

mod caps;
mod output;
mod session;

pub use caps::{ColorMode, TermCaps};
pub use output::{rgb_to_256, rgb_to_8, OutputBuffer};
pub use session::{Session, SessionConfig};
