use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::{
    nb::{self, block},
    serial::{Read, Write},
};

use super::{events, indicators, HciController, HciError, MAX_ADV_SETS};
use crate::types::{AdvSet, SentInfo};

/// How many unrelated events may arrive before a command is answered.
const MAX_SKIPPED_EVENTS: u8 = 8;

impl<SER, DO, DELAY> HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// Read events until the one that answers `opcode` arrives.
    pub(super) fn wait_for_command(
        &mut self,
        opcode: u16,
    ) -> Result<usize, HciError<SER::Error, DO::Error>> {
        for _ in 0..=MAX_SKIPPED_EVENTS {
            let indicator = block!(self._serial.read()).map_err(HciError::Serial)?;
            let (code, len) = self.read_event(indicator)?;
            match code {
                events::COMMAND_COMPLETE if len >= 3 => {
                    let answered = u16::from_le_bytes([self._buf[1], self._buf[2]]);
                    if answered != opcode {
                        // HCI_NOP (opcode 0) is sent once the controller booted
                        debug!("Skipping completion of HCI command {}", answered);
                        continue;
                    }
                    if len < 4 {
                        return Err(HciError::BinaryCorruption);
                    }
                    return match self._buf[3] {
                        0 => Ok(len),
                        status => Err(HciError::Status(status)),
                    };
                }
                events::COMMAND_STATUS if len >= 4 => {
                    if u16::from_le_bytes([self._buf[2], self._buf[3]]) == opcode {
                        return match self._buf[0] {
                            0 => Ok(len),
                            status => Err(HciError::Status(status)),
                        };
                    }
                }
                events::COMMAND_COMPLETE | events::COMMAND_STATUS => {
                    return Err(HciError::BinaryCorruption);
                }
                events::LE_META => self.handle_le_meta(len),
                _ => debug!("Skipping HCI event {}", code),
            }
        }
        Err(HciError::UnexpectedEvent)
    }

    /// Read the rest of an event whose packet `indicator` was already read.
    ///
    /// The event parameters are stored at the start of `self._buf`.
    /// Returns the event code and the parameters' length.
    fn read_event(
        &mut self,
        indicator: u8,
    ) -> Result<(u8, usize), HciError<SER::Error, DO::Error>> {
        if indicator != indicators::EVENT {
            return Err(HciError::BinaryCorruption);
        }
        let code = block!(self._serial.read()).map_err(HciError::Serial)?;
        let len = block!(self._serial.read()).map_err(HciError::Serial)? as usize;
        for byte in self._buf[..len].iter_mut() {
            *byte = block!(self._serial.read()).map_err(HciError::Serial)?;
        }
        Ok((code, len))
    }

    /// Handle an LE meta event of `len` parameter bytes.
    fn handle_le_meta(&mut self, len: usize) {
        // subevent, status, handle, connection handle (2), number of completed events
        if len < 6 || self._buf[0] != events::LE_ADV_SET_TERMINATED {
            debug!("Skipping LE meta event {}", self._buf[0]);
            return;
        }
        let handle = self._buf[2];
        if handle as usize >= MAX_ADV_SETS {
            return;
        }
        let adv = AdvSet::new(handle);
        if self._buf[1] != 0 {
            warn!("Advertising set {} terminated with status {}", handle, self._buf[1]);
        }
        let flags = self._sets[handle as usize];
        self._sets[handle as usize] = flags.with_ext_started(false);
        let info = SentInfo {
            num_sent: self._buf[5],
        };
        if self._pending_sent.is_full() {
            if let Some((dropped, _)) = self._pending_sent.pop_front() {
                warn!("Dropping unpolled sent event of {}", dropped);
            }
        }
        // cannot fail; there is room now
        let _ = self._pending_sent.push_back((adv, info));
    }

    /// Read an event if the controller has started sending one.
    ///
    /// Returns the oldest "advertising set terminated" event that is pending (if any).
    pub(super) fn try_read_sent(
        &mut self,
    ) -> Result<Option<(AdvSet, SentInfo)>, HciError<SER::Error, DO::Error>> {
        if let Some(sent) = self._pending_sent.pop_front() {
            return Ok(Some(sent));
        }
        let indicator = match self._serial.read() {
            Ok(byte) => byte,
            Err(nb::Error::WouldBlock) => return Ok(None),
            Err(nb::Error::Other(e)) => return Err(HciError::Serial(e)),
        };
        let (code, len) = self.read_event(indicator)?;
        if code == events::LE_META {
            self.handle_le_meta(len);
        } else {
            debug!("Skipping HCI event {}", code);
        }
        Ok(self._pending_sent.pop_front())
    }
}
