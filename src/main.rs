use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, warn};

use ovm_bytecode::bytecode::BytecodeReader;
use ovm_machine::machine::{self, LeakReport, Outcome, Vm};

fn usage(program_name: &str) {
    eprintln!("Usage: {} [--trace] FILE", program_name);
    eprintln!("\t   FILE: bytecode file to execute");
    eprintln!("\t--trace: echo each instruction to stderr before it executes");
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let mut args = env::args();
    let program_name = args.next().unwrap_or_else(|| "ovm".to_string());
    let mut trace = false;
    let mut file = None;
    for arg in args {
        match arg.as_str() {
            "--trace" => trace = true,
            _ if file.is_none() => file = Some(arg),
            _ => {
                usage(&program_name);
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    let file = match file {
        Some(file) => file,
        None => {
            usage(&program_name);
            return Ok(ExitCode::FAILURE);
        }
    };

    let bytes = fs::read(&file).with_context(|| format!("could not read `{}`", file))?;
    let program = BytecodeReader::new(&bytes)
        .read_program()
        .with_context(|| format!("could not deserialise program in `{}`", file))?;

    let mut vm = Vm::new(program);
    let mut stdout = io::stdout();
    let result = if trace {
        run_traced(&mut vm, &mut stdout)
    } else {
        vm.run(&mut stdout)
    };
    stdout.flush().ok();

    let status = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            machine::dump_all(&vm, &mut io::stderr())
                .context("could not dump machine state")?;
            ExitCode::FAILURE
        }
    };

    report_leaks(vm.finish());
    Ok(status)
}

/// Like [`Vm::run`], but echo every instruction to stderr as it executes.
fn run_traced(vm: &mut Vm, out: &mut impl Write) -> machine::Result<()> {
    vm.reset();
    loop {
        if let Some(instruction) = vm.current_instruction() {
            eprintln!("{:>4}: {}", vm.pc, instruction);
        }
        if vm.step(out)? == Outcome::Halt {
            return Ok(());
        }
    }
}

fn report_leaks(report: LeakReport) {
    if report.is_clean() {
        return;
    }
    if report.stack_bytes > 0 {
        warn!("stack: {}B not reclaimed", report.stack_bytes);
    }
    if report.call_frames > 0 {
        warn!("call stack: {} frames not reclaimed", report.call_frames);
    }
    if !report.pages.is_empty() {
        warn!(
            "heap: {}B over {} {} not reclaimed",
            report.page_bytes(),
            report.pages.len(),
            if report.pages.len() == 1 { "page" } else { "pages" },
        );
        for (address, capacity) in &report.pages {
            warn!("\tpage {:#x}: {}B lost", address, capacity);
        }
    }
}
