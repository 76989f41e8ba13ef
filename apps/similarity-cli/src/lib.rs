//! Question similarity command-line front end
//!
//! Loads a question corpus, embeds it with every configured method and answers
//! queries, either one-shot, as an interactive loop, or as a guessing game.

pub mod game;
pub mod repl;
pub mod state;

pub use game::GuessingGame;
pub use state::{AppState, MethodResults};
