use crate::test::*;
use crate::*;

#[test]
fn clears_the_register() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, -1),
        instr_r!(LIMP, 4),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).u(), 0);
}
