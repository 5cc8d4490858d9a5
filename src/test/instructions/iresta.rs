use crate::test::*;
use crate::*;

#[test]
fn subtracts_an_immediate() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 50),
        instr_ri!(IRESTA, 4, 8),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 42);
}
