//! Survey inputs: the question catalog and the respondent roster
//!
//! Both are loaded once at startup and are read-only for the rest of the run.

mod loader;
mod question;

pub use loader::{load_catalog, load_roster};
pub use question::{Catalog, Question, Respondent, Roster, OPTION_SLOTS, OTHER_OPTION};
