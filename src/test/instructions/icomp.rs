use crate::test::*;
use crate::*;

#[test]
fn compares_against_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 42),
        instr_ri!(ICOMP, 4, 42),
        instr_n!(PARA),
    ]);
    assert!(m.flag(constants::FLAG_ZERO));
    assert_eq!(m.register(4).i(), 42);
}
