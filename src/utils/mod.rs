pub mod clipboard;
pub mod diagnostics;
pub mod logging;
pub mod scroll;
pub mod syntax;
#[cfg(test)]
pub mod test_utils;
pub mod url;
