use anyhow::Result;
use tracing::debug;

use crate::display::format_method_table;
use crate::utils::discover_from_cwd;

/// List the catalog, including templates added by the nearest config
pub fn methods_command() -> Result<()> {
    let (config, root) = discover_from_cwd()?;
    debug!("Listing methods for project at {}", root.display());
    let catalog = config.catalog()?;
    print!("{}", format_method_table(&catalog));
    Ok(())
}
