use crate::test::*;
use crate::*;

#[test]
fn copies_and_leaves_source_unchanged() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 5, 99),
        instr_rr!(COPIA, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(4).i(), 99);
    assert_eq!(m.register(5).i(), 99);
}
