mod error;
mod instruction;
mod opcode;
mod program;

pub use error::Error;
pub use instruction::Instruction;
pub use opcode::{Arity, Opcode};
pub use program::{Header, Program};

pub type Result<A> = std::result::Result<A, Error>;

/// The four first-class integer widths, unsigned and signed. Every
/// multi-byte value on the stack, in registers and in bytecode is stored
/// little-endian.
pub type Byte = u8;
pub type SByte = i8;
pub type Short = u16;
pub type SShort = i16;
pub type Hword = u32;
pub type SHword = i32;
pub type Word = u64;
pub type SWord = i64;

pub const WORD_SIZE: usize = std::mem::size_of::<Word>();

/// An append-only bytecode buffer with a fixed capacity.
///
/// Writes fail with [`Error::ShortWrite`] once the capacity is exhausted;
/// the capacity is usually sized up front with
/// [`Program::encoded_size`]. Serialisation is symmetric: a
/// [`BytecodeReader`] over [`Bytecode::as_bytes`] reconstructs exactly what
/// was written.
#[derive(Debug)]
pub struct Bytecode {
    bytes: Vec<u8>,
    capacity: usize,
}

impl Bytecode {
    pub fn with_capacity(capacity: usize) -> Bytecode {
        Bytecode {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn reader(&self) -> BytecodeReader<'_> {
        BytecodeReader::new(&self.bytes)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.remaining() < bytes.len() {
            return Err(Error::ShortWrite {
                wanted: bytes.len(),
                remaining: self.remaining(),
            });
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a word in little-endian order.
    pub fn write_word(&mut self, word: Word) -> Result<()> {
        self.write_bytes(&word.to_le_bytes())
    }

    pub fn write_header(&mut self, header: Header) -> Result<()> {
        if !header.is_valid() {
            return Err(Error::InvalidHeader {
                start_address: header.start_address,
                count: header.count,
            });
        }
        self.write_word(header.start_address)?;
        self.write_word(header.count)
    }

    /// Write one opcode byte followed by the operand bytes the opcode's
    /// arity dictates.
    pub fn write_instruction(&mut self, instruction: &Instruction) -> Result<()> {
        if self.remaining() < instruction.encoded_size() {
            return Err(Error::ShortWrite {
                wanted: instruction.encoded_size(),
                remaining: self.remaining(),
            });
        }
        self.write_bytes(&[instruction.opcode as u8])?;
        match instruction.opcode.arity() {
            Arity::Nullary => Ok(()),
            Arity::Unary => self.write_word(instruction.n),
            Arity::Binary => {
                self.write_word(instruction.n)?;
                self.write_bytes(&instruction.operands[..WORD_SIZE])
            }
            Arity::Nary => {
                self.write_word(instruction.n)?;
                self.write_bytes(&instruction.operands[..instruction.n as usize])
            }
        }
    }

    pub fn write_program(&mut self, program: &Program) -> Result<()> {
        self.write_header(program.header())?;
        for instruction in &program.instructions {
            self.write_instruction(instruction)?;
        }
        Ok(())
    }
}

/// A read cursor over a bytecode byte stream.
///
/// Decoded instructions borrow their operand bytes from the underlying
/// buffer rather than copying them; see [`Instruction::into_owned`] for the
/// owning flavour.
#[derive(Debug)]
pub struct BytecodeReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BytecodeReader<'a> {
    pub fn new(bytes: &'a [u8]) -> BytecodeReader<'a> {
        BytecodeReader { bytes, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Borrow the next `n` bytes and advance the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::ShortRead {
                wanted: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.bytes[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(bytes)
    }

    /// Read a word, converting from little-endian to host order.
    pub fn read_word(&mut self) -> Result<Word> {
        let bytes = self.read_bytes(WORD_SIZE)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(bytes);
        Ok(Word::from_le_bytes(word))
    }

    pub fn read_header(&mut self) -> Result<Header> {
        let start_address = self.read_word()?;
        let count = self.read_word()?;
        let header = Header {
            start_address,
            count,
        };
        if !header.is_valid() {
            return Err(Error::InvalidHeader {
                start_address,
                count,
            });
        }
        Ok(header)
    }

    pub fn read_instruction(&mut self) -> Result<Instruction<'a>> {
        let byte = self.read_bytes(1)?[0];
        let opcode = Opcode::try_from(byte)?;
        match opcode.arity() {
            Arity::Nullary => Ok(Instruction::nullary(opcode)),
            Arity::Unary => {
                let n = self.read_word()?;
                Ok(Instruction::unary(opcode, n))
            }
            Arity::Binary => {
                let n = self.read_word()?;
                let operands = self.read_bytes(WORD_SIZE)?;
                Ok(Instruction {
                    opcode,
                    n,
                    operands: operands.into(),
                })
            }
            Arity::Nary => {
                let n = self.read_word()?;
                let operands = self.read_bytes(n as usize)?;
                Ok(Instruction {
                    opcode,
                    n,
                    operands: operands.into(),
                })
            }
        }
    }

    /// Read a header and exactly `count` instructions. Bytes past the last
    /// instruction are left unread.
    pub fn read_program(&mut self) -> Result<Program<'a>> {
        let header = self.read_header()?;
        // Each instruction is at least one byte, so a count beyond the
        // remaining bytes cannot be satisfied; don't pre-allocate for it.
        let capacity = header.count.min(self.remaining() as Word) as usize;
        let mut instructions = Vec::with_capacity(capacity);
        for _ in 0..header.count {
            instructions.push(self.read_instruction()?);
        }
        Ok(Program::new(header.start_address, instructions))
    }
}
