use crate::test::*;
use crate::*;

#[test]
fn reads_the_p_flag() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 10),
        instr_ri!(ICOMP, 4, 1),
        instr_j!(SIMAYOR, 5),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}
