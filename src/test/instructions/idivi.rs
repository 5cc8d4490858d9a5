use crate::test::*;
use crate::*;

#[test]
fn divides_by_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 85),
        instr_ri!(IDIVI, 4, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 42);
}

#[test]
fn zero_immediate_traps() {
    let trap = run_trap(&[
        instr_ri!(ICARGA, 4, 1),
        instr_ri!(IDIVI, 4, 0),
        instr_n!(PARA),
    ]);
    assert_eq!(trap, Exception::DivisionByZero);
}
