use crate::test::*;
use crate::*;

#[test]
fn pops_the_pushed_word() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 11),
        instr_ri!(ICARGA, 5, 22),
        instr_r!(APILA, 4),
        instr_r!(APILA, 5),
        instr_r!(DESAPILA, 6),
        instr_r!(DESAPILA, 7),
        instr_n!(PARA),
    ]);
    // Last in, first out.
    assert_eq!(m.register(6).i(), 22);
    assert_eq!(m.register(7).i(), 11);
}
