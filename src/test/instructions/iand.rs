use crate::test::*;
use crate::*;

#[test]
fn masks_with_a_sign_extended_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 0x0F0F),
        instr_ri!(IAND, 4, 0x00FF),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 0x000F);
}

#[test]
fn minus_one_is_the_identity_mask() {
    let m = run_with(
        &[instr_ri!(IAND, 4, -1), instr_n!(PARA)],
        |machine| machine.set_register(4, 0xFFFF_FFFF_FFFF_0000),
    );
    assert_eq!(m.register(4).u(), 0xFFFF_FFFF_FFFF_0000);
}
