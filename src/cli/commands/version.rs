use anyhow::Result;

use crate::cli::Output;
use crate::{PKG_DESCRIPTION, PKG_NAME, VERSION};

pub fn execute(output: &Output) -> Result<()> {
    println!("{PKG_NAME} {VERSION}");
    output.verbose(PKG_DESCRIPTION);
    output.verbose(&format!("License: {}", env!("CARGO_PKG_LICENSE")));
    Ok(())
}
