use crate::test::*;
use crate::*;

#[test]
fn pops_the_pc_from_the_stack() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 3),
        instr_r!(APILA, 4),
        instr_n!(VUELVE),
        instr_n!(PARA),          // 3: target pushed above
    ]);
    assert_eq!(m.pc(), 4);
}
