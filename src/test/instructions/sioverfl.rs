use crate::test::*;
use crate::*;

#[test]
fn taken_after_signed_overflow() {
    let m = run_with(
        &[
            instr_ri!(ISUMA, 4, 1),
            instr_j!(SIOVERFL, 4),
            instr_ri!(ICARGA, 5, 1),
            instr_n!(PARA),
            instr_ri!(ICARGA, 5, 2),
            instr_n!(PARA),
        ],
        |machine| machine.set_register(4, i64::max_value() as u64),
    );
    assert_eq!(m.register(5).u(), 2);
}
