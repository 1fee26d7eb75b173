use std::borrow::Cow;

use ovm_bytecode::bytecode::{Bytecode, Instruction, Opcode, Program, Word};
use ovm_machine::machine::{Error, Outcome, Vm, Width};

fn push_literal(width: usize, value: Word) -> Instruction<'static> {
    Instruction {
        opcode: Opcode::Push,
        n: width as Word,
        operands: Cow::Owned(value.to_le_bytes()[..width].to_vec()),
    }
}

/// Step the machine through `steps` instructions, failing the test on any
/// fault.
fn step_times(vm: &mut Vm, steps: usize) {
    let mut out = Vec::new();
    for _ in 0..steps {
        assert_eq!(vm.step(&mut out).expect("step failed"), Outcome::Continue);
    }
}

#[test]
fn arithmetic_and_print() {
    let program = Program::new(
        0,
        vec![
            push_literal(8, 2),
            push_literal(8, 3),
            Instruction::unary(Opcode::Plus, 8),
            Instruction::unary(Opcode::Print, 8),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program);
    let mut out = Vec::new();
    vm.run(&mut out).unwrap();

    assert_eq!(vm.stack.ptr(), 0);
    assert_eq!(out, b"5\n");
}

/// An unrolled Fibonacci iteration: after `k` passes of the loop body,
/// register 0 holds `F(2k+1)` and register 1 holds `F(2k+2)`.
#[test]
fn fibonacci_to_registers() {
    let program = Program::new(
        0,
        vec![
            // Seed F(1) and F(2).
            push_literal(8, 1),
            Instruction::binary(Opcode::Mov, 8, 0),
            push_literal(8, 1),
            Instruction::binary(Opcode::Mov, 8, 1),
            // Loop body, starting at address 4.
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::binary(Opcode::PushRegister, 8, 1),
            Instruction::unary(Opcode::Plus, 8),
            Instruction::binary(Opcode::Mov, 8, 0),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::binary(Opcode::PushRegister, 8, 1),
            Instruction::unary(Opcode::Plus, 8),
            Instruction::binary(Opcode::Mov, 8, 1),
            Instruction::unary(Opcode::JumpAbs, 4),
        ],
    );

    let mut vm = Vm::new(program);
    step_times(&mut vm, 4); // seed

    let fib = |n: usize| -> Word {
        let (mut a, mut b) = (1u64, 1u64);
        for _ in 1..n {
            let next = a + b;
            a = b;
            b = next;
        }
        a
    };

    for k in 1..=20 {
        step_times(&mut vm, 9); // one loop pass, including the jump back
        assert_eq!(
            vm.registers.read_value(Width::Word, 0).unwrap(),
            fib(2 * k + 1),
            "register 0 after {} passes",
            k
        );
        assert_eq!(
            vm.registers.read_value(Width::Word, 1).unwrap(),
            fib(2 * k + 2),
            "register 1 after {} passes",
            k
        );
    }
}

/// The whole pipeline: encode a program, decode it, run the decoded copy.
#[test]
fn encoded_programs_execute_after_decoding() {
    let program = Program::new(
        0,
        vec![
            push_literal(8, 6),
            push_literal(8, 7),
            Instruction::unary(Opcode::Mult, 8),
            Instruction::unary(Opcode::Print, 8),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut bytecode = Bytecode::with_capacity(program.encoded_size());
    bytecode.write_program(&program).unwrap();

    let encoded = bytecode.into_bytes();
    let decoded = ovm_bytecode::bytecode::BytecodeReader::new(&encoded)
        .read_program()
        .unwrap();
    assert_eq!(decoded, program);

    let mut out = Vec::new();
    Vm::new(decoded).run(&mut out).unwrap();
    assert_eq!(out, b"42\n");
}

#[test]
fn heap_lifecycle() {
    let program = Program::new(
        0,
        vec![
            // One page of four words; keep the handle in register 0.
            push_literal(8, 4),
            Instruction::unary(Opcode::MallocStack, 8),
            Instruction::binary(Opcode::Mov, 8, 0),
            // Fill slot i with i * 10 using the stack-index variant.
            Instruction::binary(Opcode::PushRegister, 8, 0),
            push_literal(8, 0),
            push_literal(8, 0),
            Instruction::unary(Opcode::MsetStack, 8),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            push_literal(8, 10),
            push_literal(8, 1),
            Instruction::unary(Opcode::MsetStack, 8),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            push_literal(8, 20),
            push_literal(8, 2),
            Instruction::unary(Opcode::MsetStack, 8),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            push_literal(8, 30),
            push_literal(8, 3),
            Instruction::unary(Opcode::MsetStack, 8),
            // Read slot 2 back with the immediate-index variant, then
            // slot 1 with the stack-index variant.
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::binary(Opcode::Mget, 8, 2),
            Instruction::unary(Opcode::Print, 8),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            push_literal(8, 1),
            Instruction::unary(Opcode::MgetStack, 8),
            Instruction::unary(Opcode::Print, 8),
            // Capacity, then free.
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::nullary(Opcode::Msize),
            Instruction::unary(Opcode::Print, 8),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::nullary(Opcode::Mdelete),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program);
    let mut out = Vec::new();
    vm.run(&mut out).unwrap();

    assert_eq!(out, b"20\n10\n32\n");
    assert_eq!(vm.stack.ptr(), 0);
    assert_eq!(vm.heap.live_count(), 0);
    assert!(vm.finish().is_clean());
}

#[test]
fn deleting_a_page_twice_is_an_invalid_page_address() {
    let program = Program::new(
        0,
        vec![
            Instruction::binary(Opcode::Malloc, 8, 4),
            Instruction::binary(Opcode::Mov, 8, 0),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::nullary(Opcode::Mdelete),
            Instruction::binary(Opcode::PushRegister, 8, 0),
            Instruction::nullary(Opcode::Mdelete),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program);
    let err = vm.run(&mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidPageAddress));
    assert_eq!(vm.pc, 5);
}

/// A zero condition byte falls through without ever consulting the jump
/// target, even an out-of-range one.
#[test]
fn jump_if_falls_through_to_halt() {
    let program = Program::new(
        0,
        vec![
            push_literal(1, 0),
            Instruction::binary(Opcode::JumpIf, 1, 99),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program);
    vm.run(&mut Vec::new()).unwrap();
    assert_eq!(vm.stack.ptr(), 0);
}

/// With an 8 byte stack one word fits exactly; any further push overflows,
/// and the original word is still intact underneath.
#[test]
fn overflow_boundary_on_a_word_sized_stack() {
    let program = Program::new(
        0,
        vec![
            push_literal(8, 0xDEAD_BEEF),
            push_literal(1, 1),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program).with_stack_capacity(8);
    let err = vm.run(&mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::StackOverflow));

    let bytes = vm.stack.pop_bytes(8).unwrap();
    assert_eq!(bytes, &0xDEAD_BEEFu64.to_le_bytes());
}

#[test]
fn errors_leave_prior_state_for_inspection() {
    let program = Program::new(
        0,
        vec![
            push_literal(8, 0x1234),
            Instruction::binary(Opcode::Mov, 8, 2),
            Instruction::unary(Opcode::Pop, 8),
            Instruction::nullary(Opcode::Halt),
        ],
    );

    let mut vm = Vm::new(program);
    let err = vm.run(&mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::StackUnderflow));
    // The MOV before the failing POP committed its register write.
    assert_eq!(vm.registers.read_value(Width::Word, 2).unwrap(), 0x1234);
}
