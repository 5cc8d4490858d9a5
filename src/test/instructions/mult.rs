use crate::test::*;
use crate::*;

#[test]
fn multiplies_registers() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, -6),
        instr_ri!(ICARGA, 5, 7),
        instr_rr!(MULT, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -42);
    assert!(m.flag(constants::FLAG_NEGATIVE));
}

#[test]
fn overflow_sets_d() {
    let m = run_with(
        &[instr_rr!(MULT, 4, 4), instr_n!(PARA)],
        |machine| machine.set_register(4, i64::max_value() as u64),
    );
    assert!(m.flag(constants::FLAG_OVERFLOW));
}
