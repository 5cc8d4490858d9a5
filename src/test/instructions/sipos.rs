use crate::test::*;
use crate::*;

#[test]
fn taken_when_p_is_set() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 9),
        instr_ri!(ICOMP, 4, 3),
        instr_j!(SIPOS, 5),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}

#[test]
fn untaken_when_result_is_negative() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_ri!(ICOMP, 4, 3),
        instr_j!(SIPOS, 5),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 0);
}
