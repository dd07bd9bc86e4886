//! Session orchestration
//!
//! A session collects a question and an answer from separate triggers and
//! writes them into a canvas when the commit trigger fires.
//!
//! # Example
//!
//! ```no_run
//! use qcanvas_core::session::Session;
//!
//! let mut session = Session::new();
//! session.capture_question("What does fsync guarantee?");
//! session.capture_answer("That written data reached stable storage.");
//!
//! let outcome = session.commit("/notes/durability.canvas")?;
//! println!("wrote node {}", outcome.mutation.node_id());
//! # Ok::<(), qcanvas_core::Error>(())
//! ```

pub mod input;
#[allow(clippy::module_inception)]
pub mod session;
pub mod target;

pub use input::{InputSource, StaticInput, Trigger};
pub use session::{Handled, Outcome, Session};
pub use target::resolve_target;
