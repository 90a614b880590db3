use crate::error::Error;
use crate::tests::mock::{MockSerial, MockTimer, MockedExchange, SimulatedClock};
use crate::transport::{ByteOutcome, Transport, CHARACTER_TIMEOUT_MS};
use embedded_io::ErrorKind;

type TransportType = Transport<MockSerial, MockTimer, 1_000>;

fn transport(clock: &SimulatedClock, serial: MockSerial) -> TransportType {
    Transport::new(serial, MockTimer::new(clock))
}

#[test]
fn test_receive_byte_available() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_unsolicited(b"A");

    let mut transport = transport(&clock, serial);
    assert_eq!(Some(b'A'), transport.receive_byte(10).unwrap());
}

#[test]
fn test_receive_byte_timeout() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut transport = transport(&clock, serial);
    assert_eq!(None, transport.receive_byte(50).unwrap());
    assert!(clock.now() >= 50);
}

#[test]
fn test_receive_byte_arrives_before_deadline() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_unsolicited_at(40, b"B");

    let mut transport = transport(&clock, serial);
    assert_eq!(Some(b'B'), transport.receive_byte(100).unwrap());
    assert!(clock.now() < 100);
}

#[test]
fn test_wait_for_byte_outcomes() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_unsolicited(b"\rX");

    let mut transport = transport(&clock, serial);
    assert_eq!(ByteOutcome::Match, transport.wait_for_byte(b'\r', 10).unwrap());
    assert_eq!(ByteOutcome::Mismatch(b'X'), transport.wait_for_byte(b'\n', 10).unwrap());
    assert_eq!(ByteOutcome::Timeout, transport.wait_for_byte(b'\n', 10).unwrap());
}

#[test]
fn test_receive_byte_serial_error() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.fail_reads(ErrorKind::Other);

    let mut transport = transport(&clock, serial);
    assert_eq!(Error::Serial(ErrorKind::Other), transport.receive_byte(10).unwrap_err());
}

#[test]
fn test_flush_input_discards_stale_bytes() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_unsolicited(b"\r\n+CPIN: READY\r\n");

    let mut transport = transport(&clock, serial);
    assert_eq!(16, transport.flush_input().unwrap());
    assert_eq!(0, transport.serial.remaining_bytes());
}

#[test]
fn test_flush_input_bounded_on_chattering_line() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    for delay in 0..2_000 {
        serial.add_unsolicited_at(delay, b"~");
    }

    let mut transport = transport(&clock, serial);
    let discarded = transport.flush_input().unwrap();

    assert!(discarded > 0);
    assert!(transport.serial.remaining_bytes() > 0);
    assert!(clock.now() < 1_000);
}

#[test]
fn test_send_command_appends_crlf() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::silent(b"AT+CSQ\r\n"));

    let mut transport = transport(&clock, serial);
    transport.send_command("AT+CSQ").unwrap();

    let commands = transport.serial.get_commands_as_strings();
    assert_eq!(vec!["AT+CSQ\r\n".to_string()], commands);
}

#[test]
fn test_send_and_confirm_ok() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut transport = transport(&clock, serial);
    transport.send_and_confirm("ATE0", "OK", CHARACTER_TIMEOUT_MS).unwrap();
    assert_eq!(0, transport.serial.remaining_bytes());
}

#[test]
fn test_confirm_response_delayed_first_byte() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::delayed(b"AT+HTTPDATA=5,3000\r\n", 800, b"\r\nDOWNLOAD\r\n"));

    let mut transport = transport(&clock, serial);
    transport
        .send_and_confirm("AT+HTTPDATA=5,3000", "DOWNLOAD", 5_000)
        .unwrap();
}

#[test]
fn test_confirm_response_first_byte_timeout() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::delayed(b"ATE0\r\n", 300, b"\r\nOK\r\n"));

    let mut transport = transport(&clock, serial);
    let error = transport.send_and_confirm("ATE0", "OK", CHARACTER_TIMEOUT_MS).unwrap_err();
    assert_eq!(Error::Timeout, error);
}

#[test]
fn test_confirm_response_character_stall() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"ATE0\r\n", b"\r\nO").then(250, b"K\r\n"));

    let mut transport = transport(&clock, serial);
    let error = transport.send_and_confirm("ATE0", "OK", 1_000).unwrap_err();
    assert_eq!(Error::Timeout, error);
}

#[test]
fn test_confirm_response_short_gap_accepted() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"ATE0\r\n", b"\r\nO").then(50, b"K\r\n"));

    let mut transport = transport(&clock, serial);
    transport.send_and_confirm("ATE0", "OK", 1_000).unwrap();
}

#[test]
fn test_confirm_response_mismatch() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::error(b"AT+CGATT=1\r\n"));

    let mut transport = transport(&clock, serial);
    let error = transport.send_and_confirm("AT+CGATT=1", "OK", 1_000).unwrap_err();

    assert_eq!(
        Error::Mismatch {
            expected: b'O',
            received: b'E'
        },
        error
    );
}

#[test]
fn test_confirm_response_missing_terminator() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"ATE0\r\n", b"\r\nOKAY\r\n"));

    let mut transport = transport(&clock, serial);
    let error = transport.send_and_confirm("ATE0", "OK", 1_000).unwrap_err();

    assert_eq!(
        Error::Mismatch {
            expected: b'\r',
            received: b'A'
        },
        error
    );
}
