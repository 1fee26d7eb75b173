use std::io::{self, Write};

use super::Vm;

/// How many instructions to show either side of the program counter.
const PROGRAM_EXCERPT: usize = 5;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Dump every component of the machine state, for post-mortem inspection.
pub fn dump_all(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    dump_program(vm, out)?;
    writeln!(out, "{}", RULE)?;
    dump_call_stack(vm, out)?;
    writeln!(out, "{}", RULE)?;
    dump_heap(vm, out)?;
    writeln!(out, "{}", RULE)?;
    dump_registers(vm, out)?;
    writeln!(out, "{}", RULE)?;
    dump_stack(vm, out)?;
    writeln!(out, "{}", RULE)
}

/// An excerpt of the program around the program counter, with a cursor on
/// the current instruction.
pub fn dump_program(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    let count = vm.program.count() as usize;
    let pc = vm.pc as usize;
    writeln!(out, "Program.count = {}", count)?;
    writeln!(out, "Program.pc    = {}", pc)?;
    writeln!(out, "Program.instructions = [")?;

    let begin = pc.saturating_sub(PROGRAM_EXCERPT);
    let end = (pc + PROGRAM_EXCERPT).min(count);
    if begin > 0 {
        writeln!(out, "\t...")?;
    }
    for (index, instruction) in vm.program.instructions[begin..end].iter().enumerate() {
        let address = begin + index;
        write!(out, "\t{}: {}", address, instruction)?;
        if address == pc {
            write!(out, " <---")?;
        }
        writeln!(out)?;
    }
    if end < count {
        writeln!(out, "\t...")?;
    }
    writeln!(out, "]")
}

/// The stack top-down, one byte per line.
pub fn dump_stack(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Stack.max  = {}", vm.stack.capacity())?;
    writeln!(out, "Stack.ptr  = {}", vm.stack.ptr())?;
    write!(out, "Stack.data = [")?;
    if vm.stack.ptr() == 0 {
        return writeln!(out, "]");
    }
    writeln!(out)?;
    for (depth, byte) in vm.stack.as_bytes().iter().rev().enumerate() {
        writeln!(out, "\t{}: {:#04x}", depth, byte)?;
    }
    writeln!(out, "]")
}

/// The register file as words.
pub fn dump_registers(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Registers.size = {}B", vm.registers.size())?;
    write!(out, "Registers.reg  = [")?;
    for (index, word) in vm.registers.words().enumerate() {
        if index > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{{{}:{:#x}}}", index, word)?;
    }
    writeln!(out, "]")
}

/// Return addresses top-down.
pub fn dump_call_stack(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "CallStack.max  = {}", vm.call_stack.max())?;
    writeln!(out, "CallStack.ptr  = {}", vm.call_stack.ptr())?;
    write!(out, "CallStack.data = [")?;
    if vm.call_stack.ptr() == 0 {
        return writeln!(out, "]");
    }
    writeln!(out)?;
    for (depth, address) in vm.call_stack.addresses().iter().rev().enumerate() {
        writeln!(out, "\t{}: {:#x}", depth, address)?;
    }
    writeln!(out, "]")
}

/// Every live page and its contents.
pub fn dump_heap(vm: &Vm, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Heap.pages = {}", vm.heap.live_count())?;
    write!(out, "Heap.data  = [")?;
    if vm.heap.live_count() == 0 {
        return writeln!(out, "]");
    }
    writeln!(out)?;
    for (address, page) in vm.heap.live_pages() {
        writeln!(out, "\t[{:#x}]: {}B {{", address, page.capacity())?;
        for chunk in page.as_bytes().chunks(8) {
            write!(out, "\t\t")?;
            for (index, byte) in chunk.iter().enumerate() {
                if index > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{:02x}", byte)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "\t}}")?;
    }
    writeln!(out, "]")
}
