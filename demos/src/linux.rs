use anyhow::{anyhow, Error, Result};
pub use linux_embedded_hal::{
    gpio_cdev::{chips, Chip, LineRequestFlags},
    CdevPin, Delay, Serial,
};

extern crate std;
use std::{format, string::ToString};

/// The baud rate of the controller's HCI UART.
pub const HCI_BAUD_RATE: u32 = 1_000_000;

pub struct BoardHardware {
    gpio: Chip,
}

impl BoardHardware {
    pub fn new(dev_gpio_chip: u8) -> Result<Self> {
        // get the desired "/dev/gpiochip{dev_gpio_chip}"
        let dev_gpio = chips()?
            .find(|chip| {
                chip.as_ref().is_ok_and(|chip| {
                    chip.path()
                        .to_string_lossy()
                        .ends_with(&dev_gpio_chip.to_string())
                })
            })
            .ok_or(anyhow!(
                "Could not find specified dev/gpiochip{dev_gpio_chip} for this system."
            ))??;

        Ok(BoardHardware { gpio: dev_gpio })
    }

    #[allow(
        clippy::should_implement_trait,
        reason = "Default trait does not support `-> Result<Self>`"
    )]
    pub fn default() -> Result<Self> {
        let result = Self::new(4);
        if result.is_err() {
            return Self::new(0);
        }
        result
    }

    /// Open the serial port at `/dev/{name}` that the controller's HCI UART is attached to.
    pub fn get_serial(name: &str, baud: u32) -> Result<Serial> {
        Serial::open(format!("/dev/{name}"), baud)
            .map_err(|_| anyhow!("Serial port /dev/{name} is not available in this system"))
    }

    pub fn default_serial() -> Result<Serial> {
        BoardHardware::get_serial("ttyACM0", HCI_BAUD_RATE)
    }

    /// Get the (active low) reset line of the controller.
    ///
    /// The line is driven high (controller running) when requested.
    pub fn get_reset_pin(&mut self, reset_pin: u32) -> Result<CdevPin> {
        let reset_line = self
            .gpio
            .get_line(reset_pin)
            .map_err(|_| anyhow!("GPIO{reset_pin} is unavailable"))?;
        let reset_line_handle = reset_line
            .request(LineRequestFlags::OUTPUT, 1, "df-beacon")
            .map_err(Error::from)?;
        CdevPin::new(reset_line_handle).map_err(Error::from)
    }

    pub fn default_reset_pin(&mut self) -> Result<CdevPin> {
        self.get_reset_pin(17)
    }
}
