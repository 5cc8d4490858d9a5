use crate::test::*;
use crate::*;

#[test]
fn subtracts_registers() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 21),
        instr_ri!(ICARGA, 5, 14),
        instr_rr!(RESTA, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 7);
}

#[test]
fn negative_result_sets_n() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_ri!(ICARGA, 5, 2),
        instr_rr!(RESTA, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -1);
    assert!(m.flag(constants::FLAG_NEGATIVE));
}

#[test]
fn zero_result_sets_z() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 5),
        instr_ri!(ICARGA, 5, 5),
        instr_rr!(RESTA, 4, 5),
        instr_n!(PARA),
    ]);
    assert!(m.flag(constants::FLAG_ZERO));
    assert!(!m.flag(constants::FLAG_POSITIVE));
}
