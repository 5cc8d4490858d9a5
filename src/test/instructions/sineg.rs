use crate::test::*;
use crate::*;

#[test]
fn taken_when_n_is_set() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_ri!(ICOMP, 4, 3),
        instr_j!(SINEG, 5),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}
