use crate::test::*;
use crate::*;

#[test]
fn has_no_visible_effect() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 3),
        instr_n!(PROCRASTINA),
        instr_ri!(ISUMA, 4, 1),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 4);
}
