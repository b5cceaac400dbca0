use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use fsw_datavector::DataVector;
use fsw_errors::{Error, Result};

use crate::mode::LogMode;
use crate::names::LogNames;

/// Column at which a WATCH-mode element's value starts, measured from the
/// start of its `"<name>:"` label. Matches the original logger's fixed
/// alignment column.
const WATCH_ELEM_VALUE_START_POS: usize = 33;

/// Writes a node's Data Vector to a file, in one of two formats, on demand.
///
/// Constructed once per (Data Vector, file) pair and driven by a periodic
/// thread's `log()` call (`SPEC_FULL.md` §0). Not thread-safe to call from
/// more than one thread concurrently — the same restriction the original
/// logger documented, since a `log()` call here interleaves a DV read, a
/// snapshot write, and a file write with no lock of its own.
pub struct DataVectorLogger {
    mode: LogMode,
    dv: Arc<DataVector>,
    names: LogNames,
    file: File,
    copy_buf: Vec<u8>,
    snapshot: DataVector,
}

impl DataVectorLogger {
    /// Open `path` (creating or truncating it), write the CSV header if
    /// `mode` is [`LogMode::Csv`], and build the snapshot Data Vector used
    /// by every subsequent `log()` call.
    pub fn create(
        mode: LogMode,
        dv: Arc<DataVector>,
        path: impl AsRef<Path>,
        names: LogNames,
    ) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|_| Error::FailedToOpenFile)?;

        let snapshot = DataVector::create(dv.config().clone())?;
        let copy_buf = vec![0u8; dv.size_bytes()];

        let mut logger = Self { mode, dv, names, file, copy_buf, snapshot };

        if logger.mode == LogMode::Csv {
            let header = logger.csv_header();
            logger.file.write_all(header.as_bytes()).map_err(|_| Error::FailedToWriteFile)?;
            logger.file.write_all(b"\n").map_err(|_| Error::FailedToWriteFile)?;
        }

        Ok(logger)
    }

    /// Read the live Data Vector into a frozen snapshot, then write that
    /// snapshot to the output file per `mode`.
    pub fn log(&mut self) -> Result<()> {
        self.dv.read_all(&mut self.copy_buf)?;
        self.snapshot.write_all(&self.copy_buf)?;

        match self.mode {
            LogMode::Csv => self.write_csv_row(),
            LogMode::Watch => self.write_watch(),
        }
    }

    fn csv_header(&self) -> String {
        let mut header = String::new();
        for region in &self.dv.config().regions {
            header.push_str(&self.names.region_name(region.id));
            header.push(',');
            for elem in &region.elements {
                header.push_str(&self.names.element_name(elem.id));
                header.push(',');
            }
        }
        header
    }

    fn write_csv_row(&mut self) -> Result<()> {
        let mut row = String::new();
        for region in &self.dv.config().regions {
            row.push(',');
            for elem in &region.elements {
                let ty = self.snapshot.type_of(elem.id)?;
                let value = self.snapshot.read_typed(elem.id, ty)?;
                let _ = write!(row, "{value},");
            }
        }
        self.file.write_all(row.as_bytes()).map_err(|_| Error::FailedToWriteFile)?;
        self.file.write_all(b"\n").map_err(|_| Error::FailedToWriteFile)?;
        Ok(())
    }

    fn write_watch(&mut self) -> Result<()> {
        let mut out = String::new();
        out.push_str("\n\n---------------------------------------------\n");
        out.push_str("---------------- Data Vector ----------------\n");
        out.push_str("---------------------------------------------\n\n");

        for region in &self.dv.config().regions {
            out.push_str("\n\nRegion: ");
            out.push_str(&self.names.region_name(region.id));
            out.push_str("\n---------------------------------------------\n");

            for elem in &region.elements {
                let label = format!("{}:", self.names.element_name(elem.id));
                out.push_str(&label);
                if WATCH_ELEM_VALUE_START_POS > label.len() {
                    out.push_str(&" ".repeat(WATCH_ELEM_VALUE_START_POS - label.len()));
                }

                let ty = self.snapshot.type_of(elem.id)?;
                let value = self.snapshot.read_typed(elem.id, ty)?;
                let _ = write!(out, "{value}\n");
            }
        }

        self.file.seek(SeekFrom::Start(0)).map_err(|_| Error::FailedToSeek)?;
        self.file.write_all(out.as_bytes()).map_err(|_| Error::FailedToWriteFile)?;
        self.file.write_all(b"\n").map_err(|_| Error::FailedToWriteFile)?;
        Ok(())
    }
}
