//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that turns key presses into app actions
//!   and completion results into history updates.
//! - [`transcript`] and [`renderer`]: formatting entries into styled lines and
//!   composing the frame.
//! - [`theme`] and [`builtin_themes`]: color and style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the message format and request bookkeeping.

pub mod builtin_themes;
pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod transcript;
