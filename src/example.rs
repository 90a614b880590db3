//! Mocks for doc examples
use core::convert::Infallible;
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;
use heapless::{Deque, Vec};

/// Serial channel mock, answering known commands like a registered SIM7000
#[derive(Default)]
pub struct ExampleSerial {
    /// Command line received so far
    line: Vec<u8, 256>,

    /// Pending response bytes
    output: Deque<u8, 512>,

    /// Outstanding bytes of a HTTP request body
    upload_remaining: usize,
}

impl ExampleSerial {
    fn respond(&mut self, response: &[u8]) {
        for byte in response {
            let _ = self.output.push_back(*byte);
        }
    }

    fn handle_command(&mut self) {
        let line = self.line.clone();
        self.line.clear();

        match line.as_slice() {
            b"AT+GSN\r\n" => self.respond(b"\r\n869951030000012\r\n\r\nOK\r\n"),
            b"AT+CIMI\r\n" => self.respond(b"\r\n295050901234567\r\n\r\nOK\r\n"),
            b"AT+CGMR\r\n" => self.respond(b"\r\nRevision:1351B04SIM7000G\r\n\r\nOK\r\n"),
            b"AT+CSQ\r\n" => self.respond(b"\r\n+CSQ: 15,99\r\n\r\nOK\r\n"),
            b"AT+CGREG?\r\n" => self.respond(b"\r\n+CGREG: 0,5\r\n\r\nOK\r\n"),
            b"AT+CNSMOD?\r\n" => self.respond(b"\r\n+CNSMOD: 0,7\r\n\r\nOK\r\n"),
            b"AT+CFUN?\r\n" => self.respond(b"\r\n+CFUN: 1\r\n\r\nOK\r\n"),
            b"AT+CGNSINF\r\n" => self.respond(
                b"\r\n+CGNSINF: 1,1,20240512093015.000,52.520008,13.404954,34.700,0.00,0.0,1,,1.1,1.4,0.9,,12,7,,,38,,\r\n\r\nOK\r\n",
            ),
            b"AT+HTTPACTION=1\r\n" => self.respond(b"\r\nOK\r\n\r\n+HTTPACTION: 1,200,0\r\n"),
            command if command.starts_with(b"AT+HTTPDATA=") => {
                self.upload_remaining = command[12..]
                    .iter()
                    .take_while(|byte| byte.is_ascii_digit())
                    .fold(0, |length, byte| length * 10 + (byte - b'0') as usize);
                self.respond(b"\r\nDOWNLOAD\r\n");
            }
            _ => self.respond(b"\r\nOK\r\n"),
        }
    }
}

impl embedded_io::ErrorType for ExampleSerial {
    type Error = Infallible;
}

impl embedded_io::Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;

        while count < buf.len() {
            match self.output.pop_front() {
                Some(byte) => buf[count] = byte,
                None => break,
            }
            count += 1;
        }

        Ok(count)
    }
}

impl embedded_io::ReadReady for ExampleSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.output.is_empty())
    }
}

impl embedded_io::Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for byte in buf {
            if self.upload_remaining > 0 {
                self.upload_remaining -= 1;

                if self.upload_remaining == 0 {
                    self.respond(b"\r\nOK\r\n");
                }
                continue;
            }

            if self.line.push(*byte).is_err() {
                self.line.clear();
            }

            if self.line.ends_with(b"\r\n") {
                self.handle_command();
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Timer mock with millisecond ticks. Time advances by one tick on every clock read.
#[derive(Default)]
pub struct ExampleTimer {
    ticks: u32,

    /// End of the running countdown
    end: u32,
}

impl Timer<1_000> for ExampleTimer {
    type Error = Infallible;

    fn now(&mut self) -> TimerInstantU32<1_000> {
        self.ticks = self.ticks.wrapping_add(1);
        TimerInstantU32::from_ticks(self.ticks)
    }

    fn start(&mut self, duration: TimerDurationU32<1_000>) -> Result<(), Self::Error> {
        self.end = self.ticks.wrapping_add(duration.ticks());
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        self.ticks = self.end;
        Ok(())
    }
}

/// GPIO mock
pub struct ExamplePin;

impl embedded_hal::digital::ErrorType for ExamplePin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for ExamplePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
