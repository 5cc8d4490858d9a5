use crate::test::*;
use crate::*;

#[test]
fn adds_registers() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 42),
        instr_ri!(ICARGA, 5, 64),
        instr_rr!(SUMA, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 106);
    assert_eq!(m.register(5).i(), 64);
    assert!(m.flag(constants::FLAG_POSITIVE));
    assert!(!m.flag(constants::FLAG_ZERO));
}

#[test]
fn overflow_sets_d() {
    let m = run_with(
        &[instr_rr!(SUMA, 4, 5), instr_n!(PARA)],
        |machine| {
            machine.set_register(4, i64::max_value() as u64);
            machine.set_register(5, 1);
        },
    );
    assert!(m.flag(constants::FLAG_OVERFLOW));
    assert!(m.flag(constants::FLAG_NEGATIVE));
}
