use crate::test::*;
use crate::*;

#[test]
fn adds_one() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 41),
        instr_r!(INCRE, 4),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 42);
    assert!(m.flag(constants::FLAG_POSITIVE));
}

#[test]
fn minus_one_reaches_zero() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, -1),
        instr_r!(INCRE, 4),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 0);
    assert!(m.flag(constants::FLAG_ZERO));
}
