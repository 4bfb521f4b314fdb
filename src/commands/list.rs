//! List commands implementation

use crate::programmers;

/// List all programmers compiled into this binary
pub fn list_programmers() {
    let available = programmers::available_programmers();

    if available.is_empty() {
        println!("No programmers available (recompile with programmer features enabled)");
        return;
    }

    println!("Supported programmers:");
    println!();
    for p in &available {
        if p.aliases.is_empty() {
            println!("  {:<8} - {}", p.name, p.description);
        } else {
            println!(
                "  {:<8} - {} (aliases: {})",
                p.name,
                p.description,
                p.aliases.join(", ")
            );
        }
    }
}

/// List connected FTDI devices
#[cfg(feature = "ftdi")]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = chainprog_ftdi::list_devices()?;

    if devices.is_empty() {
        println!("No FTDI devices found");
        return Ok(());
    }

    println!("Connected FTDI devices:");
    for dev in &devices {
        println!("  {}", dev);
    }
    Ok(())
}

/// List connected FTDI devices
#[cfg(not(feature = "ftdi"))]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    Err("FTDI support not compiled in (rebuild with --features ftdi)".into())
}
