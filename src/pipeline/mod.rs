//! Interpreter pipeline for the async telegramify conversion.
//!
//! ## Data Flow
//!
//! ```text
//! content ──▶ normalize ──▶ stage 1 ──▶ … ──▶ stage N ──▶ Vec<ContentBlock>
//!            (optional)   (Raw segments in, Raw + Block segments out)
//! ```
//!
//! 1. [`crate::normalize`] cleans whitespace when the options ask for it
//! 2. each [`Interpreter`] claims the raw segments it understands
//! 3. whatever is still raw at the end becomes escaped plain text

pub mod interpreter;

pub use interpreter::{
    FileInterpreter, Interpreter, InterpreterChain, Segment, TextInterpreter,
};
