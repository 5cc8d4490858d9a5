use crate::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn forces_a_terminal_flush() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);

    let mut machine = Machine::new();
    machine
        .terminal_mut()
        .set_write_callback(move |address, text| {
            sink.borrow_mut().push((address, text.to_string()));
        });
    machine
        .load_words(
            0,
            &[
                instr_ri!(ICARGA, 4, 72), // 'H'
                instr_rm!(GUARD, 4, constants::IO_RANGE.0),
                instr_j!(INTERRUP, constants::IO_RANGE.0),
                instr_n!(PARA),
            ],
        )
        .unwrap();
    machine.prepare(0);

    for _ in 0..3 {
        machine.fetch().unwrap();
        machine.decode().unwrap();
        machine.execute().unwrap();
    }
    // The write itself is still sitting in the coalescing window; INTERRUP
    // has already flushed it without waiting for the halt.
    assert_eq!(&*log.borrow(), &[(constants::IO_RANGE.0, "H".to_string())]);
}
