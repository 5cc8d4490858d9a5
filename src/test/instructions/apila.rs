use crate::test::*;
use crate::*;

#[test]
fn pushes_at_sp_and_decrements() {
    let top = constants::STACK_RANGE.1;
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 7),
        instr_r!(APILA, 4),
        instr_n!(PARA),
    ]);
    assert_eq!(m.memory().peek(top), 7);
    assert_eq!(m.register(constants::REG_SP).u(), u64::from(top) - 1);
}

#[test]
fn push_pop_round_trips() {
    let m = run_with(
        &[
            instr_r!(APILA, 4),
            instr_r!(DESAPILA, 5),
            instr_n!(PARA),
        ],
        |machine| machine.set_register(4, 0xDEAD_BEEF),
    );
    assert_eq!(m.register(5).u(), 0xDEAD_BEEF);
    assert_eq!(
        m.register(constants::REG_SP).u(),
        u64::from(constants::STACK_RANGE.1)
    );
}
