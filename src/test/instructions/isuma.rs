use crate::test::*;
use crate::*;

#[test]
fn adds_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 40),
        instr_ri!(ISUMA, 4, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 42);
}

#[test]
fn negative_immediate_subtracts() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 10),
        instr_ri!(ISUMA, 4, -10),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 0);
    assert!(m.flag(constants::FLAG_ZERO));
}
