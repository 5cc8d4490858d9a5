use crate::test::*;
use crate::*;

#[test]
fn loads_an_absolute_address() {
    let m = run_with(
        &[instr_rm!(CARGA, 4, 131_072), instr_n!(PARA)],
        |machine| machine.load_words(131_072, &[987]).unwrap(),
    );
    assert_eq!(m.register(4).u(), 987);
}

#[test]
fn io_read_consumes_queued_input() {
    let m = run_with(
        &[
            instr_rm!(CARGA, 4, constants::IO_RANGE.0),
            instr_n!(PARA),
        ],
        |machine| machine.terminal_mut().push_input("42"),
    );
    assert_eq!(m.register(4).u(), 42);
}

#[test]
fn io_read_with_empty_queue_suspends() {
    let trap = run_trap(&[
        instr_rm!(CARGA, 4, constants::IO_RANGE.0),
        instr_n!(PARA),
    ]);
    assert_eq!(trap, Exception::InputNeeded(constants::IO_RANGE.0));
}
