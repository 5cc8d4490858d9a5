use crate::test::*;
use crate::*;

#[test]
fn multiplies_by_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 6),
        instr_ri!(IMULT, 4, -7),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -42);
}
