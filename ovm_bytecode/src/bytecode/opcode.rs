use std::convert::TryFrom;
use std::fmt;

use super::error::Error;
use super::Result;

/// How much operand data an opcode carries in bytecode.
///
/// - `Nullary` instructions are a lone opcode byte.
/// - `Unary` instructions carry `n`, a little-endian word.
/// - `Binary` instructions carry `n` plus one little-endian operand word.
/// - `Nary` instructions carry `n` plus exactly `n` raw payload bytes.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
    Nary,
}

/// The instruction set of the machine.
///
/// Each opcode is one byte on the wire. The discriminants are part of the
/// bytecode format and must never be renumbered within a release: a bytecode
/// file emitted by one build must load in any other build of the same
/// release.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum Opcode {
    // =====================================================================
    // ============================ Control ================================
    // =====================================================================
    /// Do nothing.
    Noop = 0,

    /// Stop execution cleanly.
    Halt = 1,

    // =====================================================================
    // ======================= Stack and registers =========================
    // =====================================================================
    /// Push `n` literal payload bytes onto the stack.
    ///
    /// The payload is copied verbatim: it is already in the stack's
    /// little-endian convention.
    Push = 2,

    /// Discard the top `n` bytes of the stack. `n` is a width.
    Pop = 3,

    /// Copy the register named by the operand word onto the stack.
    /// `n` is the width of the register slot.
    PushRegister = 4,

    /// Pop the top `n` bytes of the stack into the register named by the
    /// operand word.
    Mov = 5,

    /// Copy the `n`-byte value sitting `operand` positions below the top of
    /// the stack (0 = topmost) to the top.
    Dup = 6,

    // =====================================================================
    // ======================= Bitwise and logical =========================
    // =====================================================================
    /// Logical negation: pop one `n`-byte value, push 1 if it was zero and
    /// 0 otherwise, at the same width.
    Not = 7,

    Or = 8,
    And = 9,
    Xor = 10,

    /// Equality: pop two `n`-byte values, push one byte (0 or 1).
    Eq = 11,

    // =====================================================================
    // ============================ Arithmetic =============================
    // =====================================================================
    PlusUnsigned = 12,
    MultUnsigned = 13,
    SubUnsigned = 14,
    Plus = 15,
    Sub = 16,
    Mult = 17,

    // =====================================================================
    // ============================ Comparison =============================
    // =====================================================================
    // Ordered comparisons pop two `n`-byte values and push one byte.
    // The unsigned variants compare the raw bits; the signed variants
    // sign-extend first.
    LtUnsigned = 18,
    LteUnsigned = 19,
    GtUnsigned = 20,
    GteUnsigned = 21,
    Lt = 22,
    Lte = 23,
    Gt = 24,
    Gte = 25,

    // =====================================================================
    // =========================== Control flow ============================
    // =====================================================================
    /// Set the program counter to `n`.
    JumpAbs = 26,

    /// Pop `n` bytes; if any is non-zero, jump to the operand word.
    JumpIf = 27,

    /// Push the address of the next instruction onto the call stack and
    /// jump to `n`.
    Call = 28,

    /// Pop the call stack and jump to the popped address.
    Ret = 29,

    // =====================================================================
    // ============================== Heap =================================
    // =====================================================================
    /// Allocate a zero-initialised page of `operand · n` bytes and push its
    /// address.
    Malloc = 30,

    /// As `Malloc`, but the element count is popped from the stack.
    MallocStack = 31,

    /// Pop a value of width `n` and a page address; store the value in
    /// element `operand` of the page.
    Mset = 32,

    /// As `Mset`, but the element index is popped from the stack first.
    MsetStack = 33,

    /// Pop a page address; push element `operand` of the page at width `n`.
    Mget = 34,

    /// As `Mget`, but the element index is popped from the stack first.
    MgetStack = 35,

    /// Pop a page address and free the page.
    Mdelete = 36,

    /// Pop a page address and push the page capacity in bytes.
    Msize = 37,

    // =====================================================================
    // =============================== I/O =================================
    // =====================================================================
    /// Pop `n` bytes and print the value as an unsigned decimal.
    Print = 38,

    /// Pop `n` bytes and print the value as a signed decimal.
    PrintSigned = 39,

    /// Pop `n` bytes and print the lowest byte as an ASCII character.
    PrintChar = 40,
}

impl Opcode {
    /// Every opcode, in discriminant order.
    pub const ALL: [Opcode; 41] = [
        Opcode::Noop,
        Opcode::Halt,
        Opcode::Push,
        Opcode::Pop,
        Opcode::PushRegister,
        Opcode::Mov,
        Opcode::Dup,
        Opcode::Not,
        Opcode::Or,
        Opcode::And,
        Opcode::Xor,
        Opcode::Eq,
        Opcode::PlusUnsigned,
        Opcode::MultUnsigned,
        Opcode::SubUnsigned,
        Opcode::Plus,
        Opcode::Sub,
        Opcode::Mult,
        Opcode::LtUnsigned,
        Opcode::LteUnsigned,
        Opcode::GtUnsigned,
        Opcode::GteUnsigned,
        Opcode::Lt,
        Opcode::Lte,
        Opcode::Gt,
        Opcode::Gte,
        Opcode::JumpAbs,
        Opcode::JumpIf,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Malloc,
        Opcode::MallocStack,
        Opcode::Mset,
        Opcode::MsetStack,
        Opcode::Mget,
        Opcode::MgetStack,
        Opcode::Mdelete,
        Opcode::Msize,
        Opcode::Print,
        Opcode::PrintSigned,
        Opcode::PrintChar,
    ];

    pub fn arity(self) -> Arity {
        match self {
            Opcode::Noop
            | Opcode::Halt
            | Opcode::Ret
            | Opcode::Mdelete
            | Opcode::Msize => Arity::Nullary,

            Opcode::Pop
            | Opcode::Not
            | Opcode::Or
            | Opcode::And
            | Opcode::Xor
            | Opcode::Eq
            | Opcode::PlusUnsigned
            | Opcode::MultUnsigned
            | Opcode::SubUnsigned
            | Opcode::Plus
            | Opcode::Sub
            | Opcode::Mult
            | Opcode::LtUnsigned
            | Opcode::LteUnsigned
            | Opcode::GtUnsigned
            | Opcode::GteUnsigned
            | Opcode::Lt
            | Opcode::Lte
            | Opcode::Gt
            | Opcode::Gte
            | Opcode::JumpAbs
            | Opcode::Call
            | Opcode::MallocStack
            | Opcode::MsetStack
            | Opcode::MgetStack
            | Opcode::Print
            | Opcode::PrintSigned
            | Opcode::PrintChar => Arity::Unary,

            Opcode::PushRegister
            | Opcode::Mov
            | Opcode::Dup
            | Opcode::JumpIf
            | Opcode::Malloc
            | Opcode::Mset
            | Opcode::Mget => Arity::Binary,

            Opcode::Push => Arity::Nary,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Noop => "NOOP",
            Opcode::Halt => "HALT",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::PushRegister => "PUSH_REGISTER",
            Opcode::Mov => "MOV",
            Opcode::Dup => "DUP",
            Opcode::Not => "NOT",
            Opcode::Or => "OR",
            Opcode::And => "AND",
            Opcode::Xor => "XOR",
            Opcode::Eq => "EQ",
            Opcode::PlusUnsigned => "PLUS_UNSIGNED",
            Opcode::MultUnsigned => "MULT_UNSIGNED",
            Opcode::SubUnsigned => "SUB_UNSIGNED",
            Opcode::Plus => "PLUS",
            Opcode::Sub => "SUB",
            Opcode::Mult => "MULT",
            Opcode::LtUnsigned => "LT_UNSIGNED",
            Opcode::LteUnsigned => "LTE_UNSIGNED",
            Opcode::GtUnsigned => "GT_UNSIGNED",
            Opcode::GteUnsigned => "GTE_UNSIGNED",
            Opcode::Lt => "LT",
            Opcode::Lte => "LTE",
            Opcode::Gt => "GT",
            Opcode::Gte => "GTE",
            Opcode::JumpAbs => "JUMP_ABS",
            Opcode::JumpIf => "JUMP_IF",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Malloc => "MALLOC",
            Opcode::MallocStack => "MALLOC_STACK",
            Opcode::Mset => "MSET",
            Opcode::MsetStack => "MSET_STACK",
            Opcode::Mget => "MGET",
            Opcode::MgetStack => "MGET_STACK",
            Opcode::Mdelete => "MDELETE",
            Opcode::Msize => "MSIZE",
            Opcode::Print => "PRINT",
            Opcode::PrintSigned => "PRINT_SIGNED",
            Opcode::PrintChar => "PRINT_CHAR",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Opcode> {
        Opcode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(Error::InvalidOpcode(byte))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
