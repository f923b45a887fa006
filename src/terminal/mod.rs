//! Terminal output: turning display updates into bytes on a tty.

mod output;
mod printer;

pub use output::OutputBuffer;
pub use printer::RevealPrinter;
