use crate::test::*;
use crate::*;

#[test]
fn halts_and_skips_the_rest() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 4, 2),
    ]);
    assert!(m.halted());
    assert_eq!(m.register(4).i(), 1);
}
