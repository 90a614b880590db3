//! Timing constraints of the SIM7000 power and reset lines

/// Low time of `PWRKEY` to switch the module on. The datasheet asks for one second, but a short
/// pulse is sufficient in practice.
pub const POWER_ON_PULSE_MS: u32 = 100;

/// Low time of `PWRKEY` to trigger a graceful switch off
pub const POWER_OFF_PULSE_MS: u32 = 1_200;

/// Low time of `RESET` to trigger a module reset
pub const RESET_PULSE_MS: u32 = 252;

/// Default time the module gets to answer the echo probe after power on or reset
pub const BOOT_TIMEOUT_MS: u32 = 10_000;
