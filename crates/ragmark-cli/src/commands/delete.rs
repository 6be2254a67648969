//! Delete command (stub)

use anyhow::Result;

pub async fn run() -> Result<()> {
    println!("Deleting indexed records is not implemented yet.");
    Ok(())
}
