use crate::test::*;
use crate::*;

#[test]
fn divides_truncating_toward_zero() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, -7),
        instr_ri!(ICARGA, 5, 2),
        instr_rr!(DIVI, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -3);
}

#[test]
fn division_by_zero_traps() {
    let trap = run_trap(&[
        instr_ri!(ICARGA, 4, 9),
        instr_rr!(DIVI, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(trap, Exception::DivisionByZero);
}
