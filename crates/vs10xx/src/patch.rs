//! Compressed plugin (`.plg`) decoder
//!
//! VLSI distributes patches and application plugins as a flat `u16` table
//! of records:
//!
//! ```text
//! addr  count  value...
//!
//! count & 0x8000 != 0   run:  one value, written (count & 0x7FFF) times
//! count & 0x8000 == 0   copy: count values, written in order
//! ```
//!
//! Every value goes to the same SCI address `addr`; multi-word uploads rely
//! on the chip auto-incrementing its WRAM address between writes.
//!
//! [`PatchProgram::parse`] walks the whole table up front, so a truncated or
//! corrupt table is rejected before the first register is touched.

use core::iter::{Copied, Repeat, Take};
use core::slice::Iter;

use crate::error::PatchError;

/// Flag bit in the count word marking a run record.
pub const RUN_FLAG: u16 = 0x8000;

/// One decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRecord<'a> {
    /// Write `value` to `address` `count` times.
    Run {
        /// SCI address
        address: u8,
        /// Repeat count
        count: u16,
        /// Value replayed
        value: u16,
    },
    /// Write each of `values` to `address`, in order.
    Copy {
        /// SCI address
        address: u8,
        /// Values written
        values: &'a [u16],
    },
}

impl<'a> PatchRecord<'a> {
    /// Target SCI address.
    pub fn address(&self) -> u8 {
        match *self {
            PatchRecord::Run { address, .. } | PatchRecord::Copy { address, .. } => address,
        }
    }

    /// Number of register writes this record expands to.
    pub fn len(&self) -> usize {
        match *self {
            PatchRecord::Run { count, .. } => usize::from(count),
            PatchRecord::Copy { values, .. } => values.len(),
        }
    }

    /// Whether the record expands to no writes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values written, in order.
    pub fn values(&self) -> RecordValues<'a> {
        match *self {
            PatchRecord::Run { count, value, .. } => {
                RecordValues::Run(core::iter::repeat(value).take(usize::from(count)))
            }
            PatchRecord::Copy { values, .. } => RecordValues::Copy(values.iter().copied()),
        }
    }
}

/// Iterator over the values of one [`PatchRecord`].
#[derive(Debug, Clone)]
pub enum RecordValues<'a> {
    /// Repeated value
    Run(Take<Repeat<u16>>),
    /// Literal values
    Copy(Copied<Iter<'a, u16>>),
}

impl Iterator for RecordValues<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        match self {
            RecordValues::Run(it) => it.next(),
            RecordValues::Copy(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            RecordValues::Run(it) => it.size_hint(),
            RecordValues::Copy(it) => it.size_hint(),
        }
    }
}

/// A validated plugin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchProgram<'a> {
    words: &'a [u16],
    writes: usize,
}

impl<'a> PatchProgram<'a> {
    /// Validate `words` as a sequence of complete records.
    pub fn parse(words: &'a [u16]) -> Result<Self, PatchError> {
        let mut offset = 0usize;
        let mut writes = 0usize;
        while offset < words.len() {
            let (record, next) = decode(words, offset)?;
            writes = writes.saturating_add(record.len());
            offset = next;
        }
        Ok(Self { words, writes })
    }

    /// Total number of register writes the table expands to.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Records in table order.
    pub fn records(&self) -> Records<'a> {
        Records {
            words: self.words,
            offset: 0,
        }
    }

    /// Every `(address, value)` register write, in order.
    pub fn writes(&self) -> impl Iterator<Item = (u8, u16)> + 'a {
        self.records().flat_map(|record| {
            let address = record.address();
            record.values().map(move |value| (address, value))
        })
    }
}

/// Iterator over the records of a [`PatchProgram`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    words: &'a [u16],
    offset: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = PatchRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.words.len() {
            return None;
        }
        // Tables are validated in `PatchProgram::parse`, decoding cannot fail here.
        let (record, next) = decode(self.words, self.offset).ok()?;
        self.offset = next;
        Some(record)
    }
}

/// Decode the record starting at `offset`; returns it with the offset of
/// the following record.
fn decode(words: &[u16], offset: usize) -> Result<(PatchRecord<'_>, usize), PatchError> {
    let truncated = PatchError::Truncated { offset };
    let header_end = offset.checked_add(2).ok_or(truncated)?;
    let Some(&[addr, count]) = words.get(offset..header_end) else {
        return Err(truncated);
    };
    let address =
        u8::try_from(addr).map_err(|_| PatchError::AddressOutOfRange { offset, address: addr })?;

    if count & RUN_FLAG != 0 {
        let value = *words.get(header_end).ok_or(truncated)?;
        let record = PatchRecord::Run {
            address,
            count: count & !RUN_FLAG,
            value,
        };
        Ok((record, header_end.saturating_add(1)))
    } else {
        let end = header_end
            .checked_add(usize::from(count))
            .ok_or(truncated)?;
        let values = words.get(header_end..end).ok_or(truncated)?;
        Ok((PatchRecord::Copy { address, values }, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_record_repeats_one_value() {
        let program = PatchProgram::parse(&[0x10, 0x8003, 0x55AA]).unwrap();
        let writes: std::vec::Vec<_> = program.writes().collect();
        assert_eq!(writes, [(0x10, 0x55AA); 3]);
        assert_eq!(program.write_count(), 3);
    }

    #[test]
    fn copy_record_writes_values_in_order() {
        let program = PatchProgram::parse(&[0x20, 2, 0x1111, 0x2222]).unwrap();
        let writes: std::vec::Vec<_> = program.writes().collect();
        assert_eq!(writes, [(0x20, 0x1111), (0x20, 0x2222)]);
    }

    #[test]
    fn mixed_records() {
        let table = [0x07, 0x0001, 0x8010, 0x06, 0x8002, 0x0000, 0x0A, 1, 0x0050];
        let program = PatchProgram::parse(&table).unwrap();
        let records: std::vec::Vec<_> = program.records().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            PatchRecord::Run {
                address: 0x06,
                count: 2,
                value: 0
            }
        );
        assert_eq!(program.write_count(), 4);
    }

    #[test]
    fn empty_table_is_valid() {
        let program = PatchProgram::parse(&[]).unwrap();
        assert_eq!(program.writes().count(), 0);
    }

    #[test]
    fn zero_length_records_write_nothing() {
        let program = PatchProgram::parse(&[0x06, 0x8000, 0xFFFF, 0x06, 0]).unwrap();
        assert_eq!(program.writes().count(), 0);
        assert_eq!(program.records().count(), 2);
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert_eq!(
            PatchProgram::parse(&[0x06, 1, 0x1234, 0x06]),
            Err(PatchError::Truncated { offset: 3 })
        );
    }

    #[test]
    fn truncated_run_value_is_rejected() {
        assert_eq!(
            PatchProgram::parse(&[0x06, 0x8004]),
            Err(PatchError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn truncated_copy_run_is_rejected() {
        assert_eq!(
            PatchProgram::parse(&[0x06, 0x8001, 0, 0x06, 3, 1, 2]),
            Err(PatchError::Truncated { offset: 3 })
        );
    }

    #[test]
    fn address_wider_than_a_byte_is_rejected() {
        assert_eq!(
            PatchProgram::parse(&[0x0100, 1, 0]),
            Err(PatchError::AddressOutOfRange {
                offset: 0,
                address: 0x0100
            })
        );
    }
}
