//! UI utilities for the terminal chat view.

use std::io::Write;

/// Redisplay the prompt after printing a pushed message
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}
