use thiserror::Error;

use super::width::Width;

/// Every fault a running program can produce. Faults are returned, never
/// thrown: the machine state up to the failing instruction stays intact for
/// inspection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("STACK_UNDERFLOW")]
    StackUnderflow,

    #[error("STACK_OVERFLOW")]
    StackOverflow,

    #[error("CALL_STACK_UNDERFLOW")]
    CallStackUnderflow,

    #[error("CALL_STACK_OVERFLOW")]
    CallStackOverflow,

    /// The instruction is malformed: either the opcode itself or a width
    /// operand outside {1, 2, 4, 8}.
    #[error("INVALID_OPCODE")]
    InvalidOpcode,

    #[error("INVALID_REGISTER_{0}")]
    InvalidRegister(Width),

    #[error("INVALID_PROGRAM_ADDRESS")]
    InvalidProgramAddress,

    #[error("INVALID_PAGE_ADDRESS")]
    InvalidPageAddress,

    #[error("OUT_OF_BOUNDS")]
    OutOfBounds,

    /// The program counter ran past the last instruction without a HALT.
    #[error("END_OF_PROGRAM")]
    EndOfProgram,

    #[error("print failed: {0}")]
    Print(#[from] std::io::Error),
}
