//! Formatted block table
//!
//! [`Heap::dump`] writes the classic debugging view of the chain: one row
//! per block with its status, predecessor status, begin/end offsets, and
//! size, followed by used/free/total byte counts. The table is produced
//! from the read-only walker and never mutates the heap.

use super::Heap;
use std::io;

const RULE: &str = "---------------------------------------------------------------------";
const BANNER: &str = "*********************************** Block list ***********************";

impl Heap {
    /// Write the block table to `out`.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", BANNER)?;
        writeln!(out, "No.\tStatus\tPrev\tt_Begin\t\tt_End\t\tt_Size")?;
        writeln!(out, "{}", RULE)?;

        let mut used_size = 0;
        let mut free_size = 0;

        for block in self.blocks() {
            let status = if block.allocated { "used" } else { "Free" };
            let prev_status = if block.prev_allocated { "used" } else { "Free" };

            if block.allocated {
                used_size += block.size;
            } else {
                free_size += block.size;
            }

            writeln!(
                out,
                "{}\t{}\t{}\t0x{:08x}\t0x{:08x}\t{}",
                block.index + 1,
                status,
                prev_status,
                block.start,
                block.end(),
                block.size
            )?;
        }

        writeln!(out, "{}", RULE)?;
        writeln!(out, "Total used size = {}", used_size)?;
        writeln!(out, "Total free size = {}", free_size)?;
        writeln!(out, "Total size = {}", used_size + free_size)?;
        writeln!(out, "{}", RULE)?;

        Ok(())
    }

    /// The block table as a `String`, for callers that want to log it.
    pub fn dump_to_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec<u8> cannot fail
        let _ = self.dump(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
