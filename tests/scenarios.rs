//! End-to-end replay scenarios over literal instruction streams, exercised
//! through the crate's public entry point rather than any internal type.

use serde_json::json;
use x86_replay_vm::{run, ExecutionRequest};

fn request_from(assembly_lines: &[&str]) -> ExecutionRequest {
    let instructions: Vec<_> = assembly_lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            json!({
                "assembly": line,
                "id": i,
                "sourceLine": i + 1,
            })
        })
        .collect();
    let value = json!({ "instructions": instructions });
    serde_json::from_value(value).expect("well-formed request")
}

#[test]
fn s1_immediate_into_register() {
    let request = request_from(&["mov rax, 5"]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    let rax = last.registers.get("rax").unwrap();
    assert_eq!(rax.hex, "0x5");
    assert_eq!(rax.decimal, 5);
    assert!(!last.flags.zf && !last.flags.sf && !last.flags.cf);
    assert!(last.stack.is_empty());
}

#[test]
fn s2_arithmetic_and_flags() {
    let request = request_from(&["mov rax, 10", "sub rax, 10"]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    assert_eq!(last.registers.get("rax").unwrap().decimal, 0);
    assert!(last.flags.zf);
    assert!(!last.flags.sf);
}

#[test]
fn s3_negative_result_sign_flag() {
    let request = request_from(&["mov rax, 1", "sub rax, 5"]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    let rax = last.registers.get("rax").unwrap();
    assert_eq!(rax.hex, "0xfffffffffffffffc");
    assert_eq!(rax.decimal, -4);
    assert!(!last.flags.zf);
    assert!(last.flags.sf);
}

#[test]
fn s4_push_pop_round_trip() {
    let request = request_from(&["mov rax, 42", "push rax", "mov rax, 0", "pop rbx"]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    assert_eq!(last.registers.get("rbx").unwrap().decimal, 42);
    assert_eq!(last.registers.get("rax").unwrap().decimal, 0);
    assert_eq!(last.registers.get("rsp").unwrap().hex, "0x7fffffffe000");
    assert!(last.stack.is_empty());
}

#[test]
fn s5_conditional_jump_taken() {
    let request = request_from(&[
        "mov rax, 3",
        "cmp rax, 3",
        "je .Leq",
        "mov rax, 99",
        ".Leq:",
        "mov rbx, 7",
    ]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    assert_eq!(last.registers.get("rax").unwrap().decimal, 3);
    assert_eq!(last.registers.get("rbx").unwrap().decimal, 7);
    assert!(last.flags.zf);
}

#[test]
fn s6_call_ret() {
    let request = request_from(&[
        "mov rax, 0",
        "call .Lf",
        "mov rbx, 2",
        "jmp .Lend",
        ".Lf:",
        "mov rax, 1",
        "ret",
        ".Lend:",
        "nop",
    ]);
    let snapshots = run(&request);
    let last = snapshots.last().unwrap();
    assert_eq!(last.registers.get("rax").unwrap().decimal, 1);
    assert_eq!(last.registers.get("rbx").unwrap().decimal, 2);
    assert_eq!(last.registers.get("rsp").unwrap().hex, "0x7fffffffe000");
}

#[test]
fn init_snapshot_reflects_cpu_before_any_instruction_runs() {
    let request = request_from(&["mov rax, 5"]);
    let snapshots = run(&request);
    let init = &snapshots[0];
    assert_eq!(init.step, 0);
    assert_eq!(init.instruction.assembly, "INIT");
    assert_eq!(init.instruction.id, json!(-1));
    assert_eq!(init.registers.get("rax").unwrap().decimal, 0);
}

#[test]
fn steps_are_assigned_in_order() {
    let request = request_from(&["mov rax, 1", "mov rbx, 2", "mov rcx, 3"]);
    let snapshots = run(&request);
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.step, i);
    }
}

#[test]
fn empty_instruction_stream_yields_empty_trace() {
    let request: ExecutionRequest = serde_json::from_value(json!({ "instructions": [] })).unwrap();
    assert!(run(&request).is_empty());
}

#[test]
fn missing_instructions_field_is_treated_as_empty() {
    let request: ExecutionRequest = serde_json::from_value(json!({})).unwrap();
    assert!(run(&request).is_empty());
}

#[test]
fn custom_max_steps_bounds_an_infinite_loop() {
    let mut value = json!({
        "instructions": [
            { "assembly": ".Lloop:", "id": 0, "sourceLine": 1 },
            { "assembly": "jmp .Lloop", "id": 1, "sourceLine": 2 },
        ],
    });
    value["maxSteps"] = json!(5);
    let request: ExecutionRequest = serde_json::from_value(value).unwrap();
    let snapshots = run(&request);
    assert_eq!(snapshots.len(), 6); // INIT + 5 executed jumps
}
