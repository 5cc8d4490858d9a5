use crate::test::*;
use crate::*;

#[test]
fn stores_to_an_absolute_address() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 375),
        instr_rm!(GUARD, 4, 131_072),
        instr_n!(PARA),
    ]);
    assert_eq!(m.memory().peek(131_072), 375);
    assert!(m.memory().modified_addresses().any(|a| a == 131_072));
}

#[test]
fn guard_with_r0_stores_the_pc() {
    // `GUARD M[x]` assembles with R = 0; executing it stores register 0.
    let m = run_ok(&[instr_rm!(GUARD, 0, 131_072), instr_n!(PARA)]);
    // PC was already advanced past the GUARD itself.
    assert_eq!(m.memory().peek(131_072), 1);
}
