use crate::test::*;
use crate::*;

#[test]
fn stores_through_a_register() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 77),
        instr_ri!(ICARGA, 5, 131_080),
        instr_rr!(GUARDIND, 4, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.memory().peek(131_080), 77);
}

#[test]
fn indirect_store_then_load_round_trips() {
    let m = run_ok(&[
        instr_ri!(ICARGA, 4, 12_345),
        instr_ri!(ICARGA, 5, 131_072),
        instr_rr!(GUARDIND, 4, 5),
        instr_rr!(CARGAIND, 6, 5),
        instr_n!(PARA),
    ]);
    assert_eq!(m.register(6).i(), 12_345);
}
