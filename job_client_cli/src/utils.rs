use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

pub fn save_json(data: &serde_json::Value, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
    println!("✅ {} written.", path.display());
    Ok(())
}

pub fn print_json(data: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
