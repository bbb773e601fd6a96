use flexi_logger::Logger;

use crate::error::Result;

pub fn init() -> Result<()> {
    Logger::try_with_env_or_str("info")?
        .log_to_stdout()
        .start()?;

    Ok(())
}
