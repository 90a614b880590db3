use crate::error::Error;
use crate::modem::Modem;
use crate::responses::{Functionality, RegistrationStatus, SignalQuality, SystemMode};
use crate::tests::mock::{MockPin, MockSerial, MockTimer, MockedExchange, SimulatedClock};
use crate::transport::CHARACTER_TIMEOUT_MS;

type ModemType = Modem<MockSerial, MockTimer, MockPin, MockPin, 1_000, 64>;

fn modem(clock: &SimulatedClock, serial: MockSerial) -> ModemType {
    Modem::new(serial, MockTimer::new(clock), MockPin::new(), MockPin::new())
}

#[test]
fn test_signal_quality() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CSQ\r\n", b"\r\n+CSQ:15,2\r\n\r\nOK\r\n"));
    serial.add_exchange(MockedExchange::answer(b"AT+CSQ\r\n", b"\r\n+CSQ: 15,2\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(SignalQuality { rssi: 15, ber: 2 }, modem.signal_quality().unwrap());
    assert_eq!(SignalQuality { rssi: 15, ber: 2 }, modem.signal_quality().unwrap());
}

#[test]
fn test_signal_quality_too_long() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CSQ\r\n", b"\r\n+CSQ: 15,2,1\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Format, modem.signal_quality().unwrap_err());
}

#[test]
fn test_signal_quality_error_response() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CSQ\r\n", b"\r\nERROR\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Rejected, modem.signal_quality().unwrap_err());
}

#[test]
fn test_registration_status() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CGREG?\r\n", b"\r\n+CGREG: 0,5\r\n\r\nOK\r\n"));
    serial.add_exchange(MockedExchange::answer(b"AT+CGREG?\r\n", b"\r\n+CGREG: 0,1\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(RegistrationStatus::RegisteredRoaming, modem.registration_status().unwrap());
    assert_eq!(RegistrationStatus::RegisteredHome, modem.registration_status().unwrap());
}

#[test]
fn test_registration_status_wrong_prefix() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CGREG?\r\n", b"\r\n+CEREG: 0,5\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Format, modem.registration_status().unwrap_err());
}

#[test]
fn test_registration_status_error_response() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CGREG?\r\n", b"\r\nERROR\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Rejected, modem.registration_status().unwrap_err());
    assert!(clock.now() < CHARACTER_TIMEOUT_MS);
}

#[test]
fn test_system_mode() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CNSMOD?\r\n", b"\r\n+CNSMOD: 0,9\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(SystemMode::NbIot, modem.system_mode().unwrap());
}

#[test]
fn test_functionality() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CFUN?\r\n", b"\r\n+CFUN: 4\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Functionality::RfDisabled, modem.functionality().unwrap());
}
