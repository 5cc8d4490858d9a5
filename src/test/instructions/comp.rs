use crate::test::*;
use crate::*;

#[test]
fn equal_operands_set_z_only() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 8),
        instr_ri!(ICARGA, 5, 8),
        instr_rr!(COMP, 4, 5),
        instr_n!(PARA),
    ]);
    assert!(m.flag(constants::FLAG_ZERO));
    assert!(!m.flag(constants::FLAG_POSITIVE));
    assert!(!m.flag(constants::FLAG_NEGATIVE));
    // Compare stores nothing.
    assert_eq!(m.register(4).i(), 8);
    assert_eq!(m.register(5).i(), 8);
}

#[test]
fn greater_left_sets_p() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 9),
        instr_ri!(ICARGA, 5, 3),
        instr_rr!(COMP, 4, 5),
        instr_n!(PARA),
    ]);
    assert!(m.flag(constants::FLAG_POSITIVE));
}

#[test]
fn smaller_left_sets_n() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 3),
        instr_ri!(ICARGA, 5, 9),
        instr_rr!(COMP, 4, 5),
        instr_n!(PARA),
    ]);
    assert!(m.flag(constants::FLAG_NEGATIVE));
}
