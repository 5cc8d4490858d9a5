use crate::test::*;
use crate::*;

#[test]
fn jump_is_absolute() {
    let m = run_ok(&[
        instr_j!(SALTA, 2),
        instr_ri!(ICARGA, 4, 1),
        instr_n!(PARA),
    ]);
    // The skipped instruction never ran.
    assert_eq!(m.register(4).u(), 0);
}

#[test]
fn jump_out_of_memory_traps_on_fetch() {
    let trap = run_trap(&[instr_j!(SALTA, 0xFF_FFFF), instr_n!(PARA)]);
    // The jump lands on an unwritten word, which decodes as ICARGA R0 and is
    // refused before it can corrupt the PC.
    assert_eq!(trap, Exception::ReservedRegister(0));
}
