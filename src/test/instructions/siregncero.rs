use crate::test::*;
use crate::*;

#[test]
fn jumps_when_the_register_is_nonzero() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 5),
        instr_rm!(SIREGNCERO, 4, 4),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}
