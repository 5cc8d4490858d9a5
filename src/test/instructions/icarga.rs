use crate::test::*;
use crate::*;

#[test]
fn loads_a_sign_extended_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, -5),
        instr_ri!(ICARGA, 5, i32::max_value()),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -5);
    assert_eq!(m.register(5).i(), i64::from(i32::max_value()));
}
