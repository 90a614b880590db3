use crate::error::Error;
use crate::modem::{Modem, PowerState};
use crate::tests::mock::{FaultyPin, MockPin, MockSerial, MockTimer, MockedExchange, SimulatedClock};
use crate::transport::CHARACTER_TIMEOUT_MS;
use embedded_io::ErrorKind;
use mockall::Sequence;

type ModemType = Modem<MockSerial, MockTimer, MockPin, MockPin, 1_000, 64>;

fn modem(clock: &SimulatedClock, serial: MockSerial) -> ModemType {
    Modem::new(serial, MockTimer::new(clock), MockPin::new(), MockPin::new())
}

#[test]
fn test_probe_ok() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut modem = modem(&clock, serial);
    modem.probe().unwrap();
}

#[test]
fn test_probe_echo_enabled() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"ATE0\r\n", b"ATE0\r\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    let error = modem.probe().unwrap_err();

    assert_eq!(
        Error::Mismatch {
            expected: b'\r',
            received: b'A'
        },
        error
    );
}

#[test]
fn test_wait_until_ready_after_silent_probes() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::silent(b"ATE0\r\n"));
    serial.add_exchange(MockedExchange::silent(b"ATE0\r\n"));
    serial.add_exchange(MockedExchange::silent(b"ATE0\r\n"));
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut modem = modem(&clock, serial);
    modem.wait_until_ready(2_000).unwrap();

    assert_eq!(PowerState::Ready, modem.state());
    assert!(clock.now() < 2_000);

    let commands = modem.engine.transport.serial.get_commands_as_strings();
    assert_eq!(4, commands.len());
}

#[test]
fn test_wait_until_ready_never_answered() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Timeout, modem.wait_until_ready(2_000).unwrap_err());

    assert_eq!(PowerState::Probing, modem.state());
    assert!(clock.now() >= 2_000);

    let commands = modem.engine.transport.serial.get_commands_as_strings();
    assert!(commands.len() > 10);
    assert!(commands.iter().all(|command| command.as_str() == "ATE0\r\n"));
}

#[test]
fn test_wait_until_ready_retries_garbage() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"ATE0\r\n", b"\r\n\xFF\xFF\r\n"));
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut modem = modem(&clock, serial);
    modem.wait_until_ready(2_000).unwrap();
    assert_eq!(PowerState::Ready, modem.state());
}

#[test]
fn test_wait_until_ready_serial_fault() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.fail_reads(ErrorKind::BrokenPipe);

    let mut modem = modem(&clock, serial);
    let error = modem.wait_until_ready(2_000).unwrap_err();

    assert_eq!(Error::Serial(ErrorKind::BrokenPipe), error);
    assert!(clock.now() < 100);
}

#[test]
fn test_power_up() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::delayed(b"ATE0\r\n", 50, b"\r\nOK\r\n"));

    let mut sequence = Sequence::new();
    let mut power_pin = MockPin::new();
    power_pin
        .expect_set_low()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));
    power_pin
        .expect_set_high()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));

    let mut modem: ModemType = Modem::new(serial, MockTimer::new(&clock), power_pin, MockPin::new());
    modem.power_up().unwrap();

    assert_eq!(PowerState::Ready, modem.state());
    assert!(clock.now() >= 100);
}

#[test]
fn test_power_down() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut modem: ModemType = Modem::new(serial, MockTimer::new(&clock), MockPin::idle(), MockPin::new());
    modem.power_down().unwrap();

    assert_eq!(PowerState::Off, modem.state());
    assert!(clock.now() >= 1_200);
    assert!(modem.engine.transport.serial.get_commands_as_strings().is_empty());
}

#[test]
fn test_reset_pulse_timing() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut modem: ModemType = Modem::new(serial, MockTimer::new(&clock), MockPin::new(), MockPin::idle());
    modem.assert_reset_pulse(252).unwrap();

    assert!(clock.now() >= 252);
    assert!(clock.now() < 300);
}

#[test]
fn test_init() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::silent(b"ATE0\r\n"));
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut power_pin = MockPin::new();
    let mut reset_pin = MockPin::new();

    // Idle level of both lines plus the reset pulse
    power_pin.expect_set_high().times(1).returning(|| Ok(()));
    reset_pin.expect_set_low().times(1).returning(|| Ok(()));
    reset_pin.expect_set_high().times(2).returning(|| Ok(()));

    let mut modem: ModemType = Modem::new(serial, MockTimer::new(&clock), power_pin, reset_pin);
    assert_eq!(PowerState::Off, modem.state());

    modem.init().unwrap();
    assert_eq!(PowerState::Ready, modem.state());
}

#[test]
fn test_reset_boot_timeout() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut modem: ModemType = Modem::new(serial, MockTimer::new(&clock), MockPin::new(), MockPin::idle());
    modem.set_boot_timeout_ms(500);

    assert_eq!(Error::Timeout, modem.reset().unwrap_err());
    assert!(clock.now() >= 752);
    assert!(clock.now() < 2_000);
}

#[test]
fn test_pulse_timer_fault_releases_pin() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut sequence = Sequence::new();
    let mut reset_pin = MockPin::new();
    reset_pin
        .expect_set_low()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));
    reset_pin
        .expect_set_high()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));

    let mut modem: ModemType = Modem::new(serial, MockTimer::failing(&clock), MockPin::new(), reset_pin);
    assert_eq!(Error::Timer, modem.reset().unwrap_err());
    assert_eq!(PowerState::ResetAsserted, modem.state());
}

#[test]
fn test_init_pin_fault() {
    let clock = SimulatedClock::new();
    let serial = MockSerial::new(&clock);

    let mut modem: Modem<_, _, _, _, 1_000, 64> =
        Modem::new(serial, MockTimer::new(&clock), FaultyPin, MockPin::idle());
    assert_eq!(Error::Pin, modem.init().unwrap_err());
}

#[test]
fn test_imei() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(
        b"AT+GSN\r\n",
        b"\r\n869951030000012\r\n\r\nOK\r\n",
    ));

    let mut modem = modem(&clock, serial);
    assert_eq!("869951030000012", modem.imei().unwrap().as_str());
}

#[test]
fn test_imei_too_short() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+GSN\r\n", b"\r\n12345\r\n\r\nOK\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Format, modem.imei().unwrap_err());
}

#[test]
fn test_imsi() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(
        b"AT+CIMI\r\n",
        b"\r\n295050901234567\r\n\r\nOK\r\n",
    ));

    let mut modem = modem(&clock, serial);
    assert_eq!("295050901234567", modem.imsi().unwrap().as_str());
}

#[test]
fn test_imsi_no_sim() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(b"AT+CIMI\r\n", b"\r\nERROR\r\n"));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Rejected, modem.imsi().unwrap_err());
    assert!(clock.now() < CHARACTER_TIMEOUT_MS);
}

#[test]
fn test_imsi_sim_not_inserted() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(
        b"AT+CIMI\r\n",
        b"\r\n+CME ERROR: SIM not inserted\r\n",
    ));

    let mut modem = modem(&clock, serial);
    assert_eq!(Error::Rejected, modem.imsi().unwrap_err());
    assert!(clock.now() < CHARACTER_TIMEOUT_MS);
}

#[test]
fn test_firmware_version() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::answer(
        b"AT+CGMR\r\n",
        b"\r\nRevision:1351B04SIM7000G\r\n\r\nOK\r\n",
    ));

    let mut modem = modem(&clock, serial);
    assert_eq!("Revision:1351B04SIM7000G", modem.firmware_version().unwrap().as_str());
}

#[test]
fn test_release() {
    let clock = SimulatedClock::new();
    let mut serial = MockSerial::new(&clock);
    serial.add_exchange(MockedExchange::ok(b"ATE0\r\n"));

    let mut modem = modem(&clock, serial);
    modem.probe().unwrap();

    let (serial, _, _, _) = modem.release();
    assert_eq!(0, serial.remaining_exchanges());
}
