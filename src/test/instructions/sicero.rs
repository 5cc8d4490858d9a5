use crate::test::*;
use crate::*;

#[test]
fn taken_when_z_is_set() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 5),
        instr_ri!(ICOMP, 4, 5),
        instr_j!(SICERO, 5),
        instr_ri!(ICARGA, 5, 1),
        instr_n!(PARA),
        instr_ri!(ICARGA, 5, 2),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(5).u(), 2);
}

#[test]
fn untaken_branch_only_advances_pc() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 5),
        instr_ri!(ICOMP, 4, 6),
        instr_j!(SICERO, 5),
        instr_n!(PARA),
    ]);
    // Fell through to the PARA right after the branch; flags untouched.
    assert_eq!(m.pc(), 4);
    assert!(m.flag(constants::FLAG_NEGATIVE));
    assert_eq!(
        m.register(constants::REG_SP).u(),
        u64::from(constants::STACK_RANGE.1)
    );
}
