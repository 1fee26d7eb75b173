use thiserror::Error;

#[derive(PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("Short read: {wanted} bytes wanted but only {remaining} remaining")]
    ShortRead { wanted: usize, remaining: usize },

    #[error("Short write: {wanted} bytes wanted but only {remaining} remaining")]
    ShortWrite { wanted: usize, remaining: usize },

    #[error("Invalid opcode in stream: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Invalid program header: start address {start_address} is not below instruction count {count}")]
    InvalidHeader { start_address: u64, count: u64 },
}
