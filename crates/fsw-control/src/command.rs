use fsw_datavector::{DataVector, ElementId};
use fsw_errors::{Error, Result};

/// A ground command request kind (`spec.md` §3, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CmdKind {
    None = 0,
    Launch = 1,
    Abort = 2,
    Write = 3,
}

impl TryFrom<u8> for CmdKind {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(CmdKind::None),
            1 => Ok(CmdKind::Launch),
            2 => Ok(CmdKind::Abort),
            3 => Ok(CmdKind::Write),
            _ => Err(Error::InvalidCmd),
        }
    }
}

/// The Data Vector elements the Command Handler reads and writes every
/// tick. `cmd_write_elem` and `cmd_req_num`/`last_cmd_proc_num` are `u32`;
/// `cmd_write_val` is `u64`; `cmd_req`/`cmd` are `u8`.
#[derive(Debug, Clone, Copy)]
pub struct CommandHandlerConfig {
    pub cmd_req: ElementId,
    pub cmd: ElementId,
    pub cmd_write_elem: ElementId,
    pub cmd_write_val: ElementId,
    pub cmd_req_num: ElementId,
    pub last_cmd_proc_num: ElementId,
}

/// Edge-triggered ingestion of ground command requests into the Control
/// Node (`spec.md` §4.8). Runs once per tick, Control Node only.
pub struct CommandHandler {
    config: CommandHandlerConfig,
}

impl CommandHandler {
    pub fn new(config: CommandHandlerConfig) -> Self {
        Self { config }
    }

    /// One tick of command ingestion. A request is "new" when
    /// `last_cmd_proc_num < cmd_req_num`; otherwise the pulse is cleared
    /// (`cmd <- None`) so it lasts exactly one tick.
    pub fn tick(&self, dv: &DataVector) -> Result<()> {
        let cmd_req_raw: u8 = dv.read(self.config.cmd_req)?;
        let cmd_req = CmdKind::try_from(cmd_req_raw)?;
        let cmd_req_num: u32 = dv.read(self.config.cmd_req_num)?;
        let last_cmd_proc_num: u32 = dv.read(self.config.last_cmd_proc_num)?;

        if last_cmd_proc_num < cmd_req_num {
            dv.write::<u32>(self.config.last_cmd_proc_num, cmd_req_num)?;
            dv.write::<u8>(self.config.cmd, cmd_req_raw)?;

            if cmd_req == CmdKind::Write {
                let write_elem = ElementId(dv.read::<u32>(self.config.cmd_write_elem)?);
                let write_val: u64 = dv.read(self.config.cmd_write_val)?;
                dv.element_exists(write_elem)?;
                dv.write_typed_narrowed(write_elem, write_val)?;
            }
        } else {
            dv.write::<u8>(self.config.cmd, CmdKind::None as u8)?;
        }
        Ok(())
    }
}
