use crate::test::*;
use crate::*;

#[test]
fn subtracts_one() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 1),
        instr_r!(DECRE, 4),
        instr_r!(DECRE, 4),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), -1);
    assert!(m.flag(constants::FLAG_NEGATIVE));
}
