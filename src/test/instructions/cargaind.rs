use crate::test::*;
use crate::*;

#[test]
fn loads_through_a_register() {
    let m = run_with(
        &[
            instr_ri!(ICARGA, 5, 131_072),
            instr_rr!(CARGAIND, 4, 5),
            instr_n!(PARA),
        ],
        |machine| machine.load_words(131_072, &[555]).unwrap(),
    );
    assert_eq!(m.register(4).u(), 555);
}

#[test]
fn bad_address_traps() {
    let trap = run_trap(&[
        instr_ri!(ICARGA, 5, -1),
        instr_rr!(CARGAIND, 4, 5),
        instr_n!(PARA),
    ]);
    assert!(matches!(trap, Exception::OutOfRange(_)));
}
