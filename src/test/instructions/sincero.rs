use crate::test::*;
use crate::*;

#[test]
fn taken_when_z_is_clear() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 5),
        instr_ri!(ICOMP, 4, 6),
        instr_j!(SINCERO, 5),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}
