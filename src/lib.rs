//! Ultron is a terminal chat client for a single text-completion endpoint.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the message formatter, the highlighter seam, chat history,
//!   the completion client, configuration, and app state.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`utils`] holds syntect highlighting, clipboard access, transcript and
//!   diagnostic logging, and scroll math.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
