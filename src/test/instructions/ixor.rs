use crate::test::*;
use crate::*;

#[test]
fn xors_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 0b1010),
        instr_ri!(IXOR, 4, 0b0110),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 0b1100);
}

#[test]
fn xor_with_minus_one_flips_every_bit() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 0),
        instr_ri!(IXOR, 4, -1),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -1);
}
