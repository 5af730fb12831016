//! HD44780 16x2 character LCD behind a PCF8574 I2C backpack.
//!
//! The backpack maps its 8 output bits onto the panel as
//!
//! ```text
//!   P7 P6 P5 P4 | P3 | P2 | P1 | P0
//!   D7 D6 D5 D4 | BL | EN | RW | RS
//! ```
//!
//! so the controller runs in 4-bit mode: every byte goes out as two
//! nibbles, each latched by an EN pulse.  RW is always low (write only).
//!
//! Generic over the `embedded-hal` 1.0 [`I2c`] and [`DelayNs`] traits so
//! the same code runs against the ESP-IDF I2C driver and the test mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::display::{LCD_COLS, LCD_ROWS};
use crate::error::DisplayError;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of column 0 for each row.
const ROW_OFFSETS: [u8; LCD_ROWS as usize] = [0x00, 0x40];

pub struct Lcd1602<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd1602<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
        }
    }

    /// Power-on reset into 4-bit, two-line mode, display on, cleared.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        self.expander_write(0)?;

        // Three 8-bit function-set nibbles resynchronise the controller
        // whatever state it woke up in, then switch to 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)?;

        info!("LCD: 16x2 ready at 0x{:02X}", self.addr);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        // Clear is the one slow instruction (1.52 ms).
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        let base = *ROW_OFFSETS
            .get(usize::from(row))
            .ok_or(DisplayError::InvalidRow)?;
        self.command(CMD_SET_DDRAM | (base + col.min(LCD_COLS as u8 - 1)))
    }

    /// Write `text` at the start of `row`, padded with blanks to the
    /// panel width.  Non-ASCII characters are shown as `?`.
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(0, row)?;
        let mut chars = text.chars();
        for _ in 0..LCD_COLS {
            let c = match chars.next() {
                Some(c) if c.is_ascii() && !c.is_ascii_control() => c as u8,
                Some(_) => b'?',
                None => b' ',
            };
            self.data(c)?;
        }
        Ok(())
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, RS)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let bits = (nibble << 4) | mode;
        self.expander_write(bits | EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits)?;
        // Most instructions settle within 37 us.
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.addr, &[bits | BACKLIGHT])
            .map_err(|_| DisplayError::Bus)
    }
}
