use crate::test::*;
use crate::*;

#[test]
fn call_pushes_the_return_address() {
    let m = run_ok(&[
        instr_j!(LLAMA, 3),      // 0: call the subroutine
        instr_ri!(ICARGA, 5, 7), // 1: runs after the return
        instr_n!(PARA),          // 2
        instr_ri!(ICARGA, 4, 1), // 3: subroutine body
        instr_n!(VUELVE),        // 4
    ]);
    assert_eq!(m.register(4).i(), 1);
    assert_eq!(m.register(5).i(), 7);
    // Call/return leaves the stack pointer balanced.
    assert_eq!(
        m.register(constants::REG_SP).u(),
        u64::from(constants::STACK_RANGE.1)
    );
}
