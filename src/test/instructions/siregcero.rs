use crate::test::*;
use crate::*;

#[test]
fn jumps_when_the_register_is_zero() {
    let m = run_ok(&[
        instr_rm!(SIREGCERO, 4, 3),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 6, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 0);
    assert_eq!(m.register(6).u(), 2);
}

#[test]
fn falls_through_when_nonzero() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_rm!(SIREGCERO, 4, 4),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 1);
}
