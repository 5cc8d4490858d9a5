use crate::test::*;
use crate::*;

#[test]
fn ors_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 0x0F00),
        instr_ri!(IOR, 4, 0x00F0),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 0x0FF0);
}
